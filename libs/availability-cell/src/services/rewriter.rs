// libs/availability-cell/src/services/rewriter.rs
use std::collections::BTreeSet;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{delete_templates_for_clinician, get_clinician, get_location, insert_templates};
use shared_models::agenda::AvailabilityTemplate;

use crate::error::AvailabilityError;
use crate::models::{RewriteAvailabilityRequest, RewriteReport};
use crate::services::generator::generate_horizon;
use crate::services::pruner::{prune_boundary, prune_free_slots};

/// Check a schedule submission before anything is written.
/// Returns the distinct, ordered weekday indexes to create templates for.
pub fn validate_request(request: &RewriteAvailabilityRequest) -> Result<Vec<u8>, AvailabilityError> {
    if request.start_time.nanosecond() != 0 || request.end_time.nanosecond() != 0 {
        return Err(AvailabilityError::Validation(
            "Start and end times must be whole seconds".to_string(),
        ));
    }

    if request.end_time <= request.start_time {
        return Err(AvailabilityError::Validation("End time must be after start time".to_string()));
    }

    if request.duration_minutes <= 0 {
        return Err(AvailabilityError::Validation("Slot duration must be greater than zero".to_string()));
    }

    if request.horizon_weeks == Some(0) {
        return Err(AvailabilityError::Validation("Horizon must be at least one week".to_string()));
    }

    let mut days = BTreeSet::new();
    for day in &request.days {
        let index = u8::try_from(*day)
            .ok()
            .filter(|d| *d <= 6)
            .ok_or_else(|| {
                AvailabilityError::Validation(format!(
                    "Day of week must be between 0 (Monday) and 6 (Sunday), got {day}"
                ))
            })?;
        days.insert(index);
    }

    Ok(days.into_iter().collect())
}

/// Replace the clinician's templates, drop free slots from the start of today and
/// regenerate the horizon. Callers run this inside one transaction so a failure
/// in any step leaves no trace.
pub fn rewrite_availability(
    conn: &Connection,
    clinician_id: &Uuid,
    request: &RewriteAvailabilityRequest,
    default_horizon_weeks: u32,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<RewriteReport, AvailabilityError> {
    debug!("Rewriting availability for clinician {}", clinician_id);

    let days = validate_request(request).inspect_err(|e| warn!("Rejected schedule for {}: {}", clinician_id, e))?;

    if get_clinician(conn, clinician_id)?.is_none() {
        return Err(AvailabilityError::ClinicianNotFound(*clinician_id));
    }
    if get_location(conn, &request.location_id)?.is_none() {
        return Err(AvailabilityError::LocationNotFound(request.location_id));
    }

    let duration_minutes = request.duration_minutes.unsigned_abs();
    let templates: Vec<AvailabilityTemplate> = days
        .into_iter()
        .map(|day_of_week| AvailabilityTemplate {
            id: Uuid::new_v4(),
            clinician_id: *clinician_id,
            day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            duration_minutes,
            modality: request.modality,
            location_id: request.location_id,
            active: true,
            created_at: now,
        })
        .collect();

    let replaced = delete_templates_for_clinician(conn, clinician_id)?;
    insert_templates(conn, &templates)?;
    debug!("Replaced {} templates with {} for clinician {}", replaced, templates.len(), clinician_id);

    let deleted_free = prune_free_slots(conn, clinician_id, prune_boundary(None, true, now, tz))?;
    let generation = generate_horizon(
        conn,
        clinician_id,
        request.horizon_weeks.unwrap_or(default_horizon_weeks),
        now,
        tz,
    )?;

    let report = RewriteReport::merge(deleted_free, generation);
    info!(
        clinician_id = %clinician_id,
        deleted_free = report.deleted_free,
        created = report.created,
        "Availability rewritten"
    );
    Ok(report)
}
