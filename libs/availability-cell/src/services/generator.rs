// libs/availability-cell/src/services/generator.rs
use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{get_clinician, insert_slots_ignoring_duplicates, list_active_templates, list_slots_from};
use shared_models::agenda::{overlaps, Slot};

use crate::error::AvailabilityError;
use crate::models::{GenerationReport, SlotInterval};
use crate::services::expander::{expand_template, start_of_local_day};

/// Materialize the clinician's active templates into slots for every local
/// date in `[today, today + horizon_weeks)`.
///
/// Candidates that already ended at `now`, or that overlap a slot already on
/// that date (including one accepted earlier in the same run), are counted and
/// skipped. Survivors go in as one batch that ignores exact duplicates, so a
/// repeated run over unchanged state creates nothing.
pub fn generate_horizon(
    conn: &Connection,
    clinician_id: &Uuid,
    horizon_weeks: u32,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<GenerationReport, AvailabilityError> {
    debug!("Generating {} week horizon for clinician {}", horizon_weeks, clinician_id);

    if get_clinician(conn, clinician_id)?.is_none() {
        return Err(AvailabilityError::ClinicianNotFound(*clinician_id));
    }

    let templates = list_active_templates(conn, clinician_id)?;
    if templates.is_empty() {
        debug!("Clinician {} has no active templates", clinician_id);
        return Ok(GenerationReport::default());
    }

    let today = now.with_timezone(tz).date_naive();
    let horizon_end = today
        .checked_add_days(Days::new(u64::from(horizon_weeks) * 7))
        .ok_or_else(|| AvailabilityError::Validation("Horizon extends past the supported calendar".to_string()))?;

    let mut taken_by_day = group_by_local_date(
        list_slots_from(conn, clinician_id, &start_of_local_day(tz, now))?,
        tz,
    );

    let mut report = GenerationReport::default();
    let mut to_create = Vec::new();

    for day in today.iter_days().take_while(|d| *d < horizon_end) {
        let taken = taken_by_day.entry(day).or_default();

        for template in &templates {
            for candidate in expand_template(template, day, tz) {
                if candidate.end <= now {
                    report.skipped_past += 1;
                    continue;
                }

                if taken
                    .iter()
                    .any(|existing| overlaps(candidate.start, candidate.end, existing.start, existing.end))
                {
                    report.skipped_overlap += 1;
                    continue;
                }

                taken.push(candidate);
                to_create.push(Slot {
                    id: Uuid::new_v4(),
                    clinician_id: *clinician_id,
                    location_id: template.location_id,
                    start_at: candidate.start,
                    end_at: candidate.end,
                    modality: template.modality,
                    capacity: 1,
                    notes: None,
                    created_at: now,
                });
            }
        }
    }

    report.created = insert_slots_ignoring_duplicates(conn, &to_create)?;

    info!(
        clinician_id = %clinician_id,
        created = report.created,
        skipped_past = report.skipped_past,
        skipped_overlap = report.skipped_overlap,
        "Horizon generated"
    );

    Ok(report)
}

fn group_by_local_date(slots: Vec<Slot>, tz: &Tz) -> HashMap<NaiveDate, Vec<SlotInterval>> {
    let mut by_day: HashMap<NaiveDate, Vec<SlotInterval>> = HashMap::new();
    for slot in slots {
        by_day
            .entry(slot.start_at.with_timezone(tz).date_naive())
            .or_default()
            .push(SlotInterval {
                start: slot.start_at,
                end: slot.end_at,
            });
    }
    by_day
}
