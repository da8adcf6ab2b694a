// libs/availability-cell/src/models.rs
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::agenda::Modality;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// A clinician's new weekly schedule: one template per listed day, all sharing
/// the same window, duration, modality and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteAvailabilityRequest {
    pub days: Vec<i32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub modality: Modality,
    pub location_id: Uuid,
    pub horizon_weeks: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateHorizonRequest {
    pub horizon_weeks: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PruneQuery {
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlotsQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// ==============================================================================
// RESULT MODELS
// ==============================================================================

/// One fixed-length interval produced by expanding a template on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub created: usize,
    pub skipped_past: usize,
    pub skipped_overlap: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    pub deleted_free: usize,
    pub created: usize,
    pub skipped_past: usize,
    pub skipped_overlap: usize,
}

impl RewriteReport {
    pub fn merge(deleted_free: usize, generation: GenerationReport) -> Self {
        Self {
            deleted_free,
            created: generation.created,
            skipped_past: generation.skipped_past,
            skipped_overlap: generation.skipped_overlap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneReport {
    pub deleted_free: usize,
}
