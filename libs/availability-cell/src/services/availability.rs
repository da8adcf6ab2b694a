// libs/availability-cell/src/services/availability.rs
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_HORIZON_WEEKS};
use shared_database::{get_clinician, list_free_slots, list_templates, Database};
use shared_models::agenda::{AvailabilityTemplate, Slot};

use crate::error::AvailabilityError;
use crate::models::{GenerationReport, RewriteAvailabilityRequest, RewriteReport};
use crate::services::{generator, pruner, rewriter};

/// Entry point for schedule edits and horizon maintenance. Every mutating call
/// runs in its own transaction; the `_at` variants take "now" explicitly.
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    db: Database,
    tz: Tz,
    default_horizon_weeks: u32,
}

impl AvailabilityService {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            tz: config.clinic_timezone(),
            default_horizon_weeks: config.horizon_weeks.max(1),
        }
    }

    pub fn with_timezone(db: Database, tz: Tz) -> Self {
        Self {
            db,
            tz,
            default_horizon_weeks: DEFAULT_HORIZON_WEEKS,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn rewrite_availability(
        &self,
        clinician_id: Uuid,
        request: &RewriteAvailabilityRequest,
    ) -> Result<RewriteReport, AvailabilityError> {
        self.rewrite_availability_at(clinician_id, request, Utc::now())
    }

    pub fn rewrite_availability_at(
        &self,
        clinician_id: Uuid,
        request: &RewriteAvailabilityRequest,
        now: DateTime<Utc>,
    ) -> Result<RewriteReport, AvailabilityError> {
        self.db.write(|tx| {
            rewriter::rewrite_availability(tx, &clinician_id, request, self.default_horizon_weeks, now, &self.tz)
        })
    }

    pub fn generate_horizon(
        &self,
        clinician_id: Uuid,
        horizon_weeks: Option<u32>,
    ) -> Result<GenerationReport, AvailabilityError> {
        self.generate_horizon_at(clinician_id, horizon_weeks, Utc::now())
    }

    pub fn generate_horizon_at(
        &self,
        clinician_id: Uuid,
        horizon_weeks: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<GenerationReport, AvailabilityError> {
        let weeks = horizon_weeks.unwrap_or(self.default_horizon_weeks);
        if weeks == 0 {
            return Err(AvailabilityError::Validation("Horizon must be at least one week".to_string()));
        }
        self.db
            .write(|tx| generator::generate_horizon(tx, &clinician_id, weeks, now, &self.tz))
    }

    pub fn prune_free_slots(
        &self,
        clinician_id: Uuid,
        from: Option<DateTime<Utc>>,
        cover_today: bool,
    ) -> Result<usize, AvailabilityError> {
        self.prune_free_slots_at(clinician_id, from, cover_today, Utc::now())
    }

    pub fn prune_free_slots_at(
        &self,
        clinician_id: Uuid,
        from: Option<DateTime<Utc>>,
        cover_today: bool,
        now: DateTime<Utc>,
    ) -> Result<usize, AvailabilityError> {
        let boundary = pruner::prune_boundary(from, cover_today, now, &self.tz);
        self.db
            .write(|tx| pruner::prune_free_slots(tx, &clinician_id, boundary))
    }

    pub fn list_templates(&self, clinician_id: Uuid) -> Result<Vec<AvailabilityTemplate>, AvailabilityError> {
        self.db.read(|conn| {
            if get_clinician(conn, &clinician_id)?.is_none() {
                return Err(AvailabilityError::ClinicianNotFound(clinician_id));
            }
            Ok(list_templates(conn, &clinician_id)?)
        })
    }

    /// Unbooked slots with `from <= start < to`, ordered by start.
    pub fn free_slots(
        &self,
        clinician_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        debug!("Listing free slots for clinician {} between {} and {}", clinician_id, from, to);
        if to <= from {
            return Err(AvailabilityError::Validation("Range end must be after range start".to_string()));
        }
        self.db.read(|conn| {
            if get_clinician(conn, &clinician_id)?.is_none() {
                return Err(AvailabilityError::ClinicianNotFound(clinician_id));
            }
            Ok(list_free_slots(conn, &clinician_id, &from, &to)?)
        })
    }
}
