// libs/availability-cell/src/services/pruner.rs
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use shared_database::{delete_free_slots_from, get_clinician};

use crate::error::AvailabilityError;
use crate::services::expander::start_of_local_day;

/// Where pruning starts: start of the local day when `cover_today` is set,
/// otherwise the explicit `from`, otherwise `now`.
pub fn prune_boundary(
    from: Option<DateTime<Utc>>,
    cover_today: bool,
    now: DateTime<Utc>,
    tz: &Tz,
) -> DateTime<Utc> {
    if cover_today {
        start_of_local_day(tz, now)
    } else {
        from.unwrap_or(now)
    }
}

/// Delete the clinician's unbooked slots starting at or after `boundary`.
/// Booked slots are never touched.
pub fn prune_free_slots(
    conn: &Connection,
    clinician_id: &Uuid,
    boundary: DateTime<Utc>,
) -> Result<usize, AvailabilityError> {
    if get_clinician(conn, clinician_id)?.is_none() {
        return Err(AvailabilityError::ClinicianNotFound(*clinician_id));
    }

    let deleted = delete_free_slots_from(conn, clinician_id, &boundary)?;
    info!(clinician_id = %clinician_id, deleted, boundary = %boundary, "Pruned free slots");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cover_today_wins_over_explicit_from() {
        let now = Utc.with_ymd_and_hms(2030, 3, 4, 14, 0, 0).unwrap();
        let from = Utc.with_ymd_and_hms(2030, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(
            prune_boundary(Some(from), true, now, &Tz::UTC),
            Utc.with_ymd_and_hms(2030, 3, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn boundary_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2030, 3, 4, 14, 0, 0).unwrap();
        assert_eq!(prune_boundary(None, false, now, &Tz::UTC), now);
        let from = Utc.with_ymd_and_hms(2030, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(prune_boundary(Some(from), false, now, &Tz::UTC), from);
    }
}
