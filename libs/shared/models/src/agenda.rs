// libs/shared/models/src/agenda.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// REFERENCE DATA
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clinician {
    pub id: Uuid,
    pub full_name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
}

/// Entry of the administrator-managed booking status catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingStatus {
    pub id: i64,
    pub name: String,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    InPerson,
    Remote,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::InPerson => "in_person",
            Modality::Remote => "remote",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_person" => Ok(Modality::InPerson),
            "remote" => Ok(Modality::Remote),
            other => Err(format!("unknown modality: {other}")),
        }
    }
}

/// Recurring weekly availability rule. `day_of_week` counts from Monday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityTemplate {
    pub id: Uuid,
    pub clinician_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    pub modality: Modality,
    pub location_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityTemplate {
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_index(self.day_of_week)
    }
}

pub fn weekday_from_index(day_of_week: u8) -> Option<Weekday> {
    match day_of_week {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub id: Uuid,
    pub clinician_id: Uuid,
    pub location_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub modality: Modality,
    pub capacity: u16,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Half-open interval intersection: `[a_start, a_end)` meets `[b_start, b_end)`.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

// ==============================================================================
// BOOKINGS & AUDIT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub patient_id: Uuid,
    pub status: BookingStatus,
    pub reason: String,
    pub note: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    ChangeStatus,
    Cancel,
    Reschedule,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::ChangeStatus => "change_status",
            AuditAction::Cancel => "cancel",
            AuditAction::Reschedule => "reschedule",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "change_status" => Ok(AuditAction::ChangeStatus),
            "cancel" => Ok(AuditAction::Cancel),
            "reschedule" => Ok(AuditAction::Reschedule),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// Append-only history entry. `booking_id` survives the deletion of its booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub booking_id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!overlaps(9, 10, 10, 11));
        assert!(!overlaps(10, 11, 9, 10));
        assert!(overlaps(9, 11, 10, 12));
        assert!(overlaps(10, 11, 9, 12));
    }

    #[test]
    fn day_index_counts_from_monday() {
        assert_eq!(weekday_from_index(0), Some(Weekday::Mon));
        assert_eq!(weekday_from_index(6), Some(Weekday::Sun));
        assert_eq!(weekday_from_index(7), None);
    }

    #[test]
    fn modality_round_trips_through_storage_names() {
        assert_eq!("remote".parse::<Modality>(), Ok(Modality::Remote));
        assert_eq!(Modality::InPerson.to_string(), "in_person");
        assert!("video".parse::<Modality>().is_err());
    }
}
