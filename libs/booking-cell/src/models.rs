// libs/booking-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateRequest {
    pub slot_id: Uuid,
    pub patient_id: Uuid,
    pub status_id: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub status_id: i64,
}

/// Front-desk edit: the full desired status and note. Only the fields that
/// differ from the stored booking are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    pub status_id: i64,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub slot_id: Uuid,
    #[serde(default)]
    pub reason: String,
}
