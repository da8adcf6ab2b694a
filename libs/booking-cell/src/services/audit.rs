// libs/booking-cell/src/services/audit.rs
//! Detail payloads written alongside each booking mutation.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use shared_models::agenda::{Booking, BookingStatus};

pub fn create_detail(reason: &str, patient_id: Uuid, status: &BookingStatus) -> Value {
    json!({
        "reason": reason,
        "patient_id": patient_id,
        "status": status.name,
    })
}

pub fn cancel_detail(booking: &Booking) -> Value {
    json!({
        "patient_id": booking.patient_id,
        "slot_id": booking.slot_id,
    })
}

pub fn status_change_detail(before: &BookingStatus, after: &BookingStatus) -> Value {
    json!({
        "before": before.name,
        "after": after.name,
    })
}

pub fn reschedule_detail(before: Uuid, after: Uuid, reason: &str) -> Value {
    json!({
        "slot": { "before": before, "after": after },
        "reason": reason,
    })
}

/// Field-level diff for an edit. Holds only the fields that changed; an empty
/// diff means the edit is a no-op.
#[derive(Debug, Default)]
pub struct FieldChanges {
    fields: Map<String, Value>,
}

impl FieldChanges {
    pub fn record<T: PartialEq + serde::Serialize>(&mut self, field: &str, before: T, after: T) {
        if before != after {
            self.fields
                .insert(field.to_string(), json!({ "before": before, "after": after }));
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_detail(self) -> Value {
        Value::Object(self.fields)
    }
}
