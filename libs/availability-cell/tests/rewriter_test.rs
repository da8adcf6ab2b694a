// libs/availability-cell/tests/rewriter_test.rs
use assert_matches::assert_matches;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use availability_cell::{AvailabilityError, AvailabilityService, RewriteAvailabilityRequest};
use shared_database::{insert_booking, list_slots_from, slot_is_booked};
use shared_models::agenda::{Booking, Modality, Slot};
use shared_utils::test_utils::AgendaFixture;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, day, hour, minute, 0).unwrap()
}

fn request(fixture: &AgendaFixture, days: Vec<i32>, start: u32, end: u32, duration: i32) -> RewriteAvailabilityRequest {
    RewriteAvailabilityRequest {
        days,
        start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        duration_minutes: duration,
        modality: Modality::InPerson,
        location_id: fixture.location.id,
        horizon_weeks: Some(1),
    }
}

fn slots(fixture: &AgendaFixture) -> Vec<Slot> {
    fixture
        .db
        .read(|conn| list_slots_from(conn, &fixture.clinician.id, &at(1, 0, 0)))
        .unwrap()
}

fn book(fixture: &AgendaFixture, slot: &Slot) {
    let status = fixture.status("Confirmed").unwrap();
    fixture
        .db
        .write(|tx| {
            insert_booking(
                tx,
                &Booking {
                    id: Uuid::new_v4(),
                    slot_id: slot.id,
                    patient_id: fixture.patient.id,
                    status,
                    reason: "control".to_string(),
                    note: String::new(),
                    created_by: fixture.actor,
                    created_at: at(4, 8, 0),
                    updated_at: at(4, 8, 0),
                },
            )
        })
        .unwrap();
}

fn service(fixture: &AgendaFixture) -> AvailabilityService {
    AvailabilityService::with_timezone(fixture.db.clone(), Tz::UTC)
}

#[test]
fn rewrite_replaces_previous_templates() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);

    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0, 2], 9, 12, 30), at(4, 8, 0))
        .unwrap();
    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![1], 15, 17, 60), at(4, 8, 0))
        .unwrap();

    let templates = service.list_templates(fixture.clinician.id).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].day_of_week, 1);
    assert_eq!(templates[0].duration_minutes, 60);

    // Only Tuesday slots remain for the horizon.
    let remaining = slots(&fixture);
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|s| s.start_at.date_naive() == at(5, 0, 0).date_naive()));
}

#[test]
fn booked_slot_survives_rewrite_and_blocks_new_candidates() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);

    let first = service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 11, 30), at(4, 8, 0))
        .unwrap();
    assert_eq!(first.created, 4);

    let booked = slots(&fixture)
        .into_iter()
        .find(|s| s.start_at == at(4, 10, 0))
        .unwrap();
    book(&fixture, &booked);

    let second = service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 11, 60), at(4, 8, 0))
        .unwrap();

    assert_eq!(second.deleted_free, 3);
    assert_eq!(second.created, 1);
    assert_eq!(second.skipped_overlap, 1);

    let remaining = slots(&fixture);
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().any(|s| s.id == booked.id));
    assert!(fixture.db.read(|conn| slot_is_booked(conn, &booked.id)).unwrap());
}

#[test]
fn free_slots_earlier_today_are_removed() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);

    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 10, 30), at(4, 8, 0))
        .unwrap();
    assert_eq!(slots(&fixture).len(), 2);

    // At noon the morning slots are in the past but still on today's local date.
    let report = service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 10, 30), at(4, 12, 0))
        .unwrap();

    assert_eq!(report.deleted_free, 2);
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped_past, 2);
    assert!(slots(&fixture).is_empty());
}

#[test]
fn invalid_window_changes_nothing() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);
    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 10, 30), at(4, 8, 0))
        .unwrap();

    let result = service.rewrite_availability_at(
        fixture.clinician.id,
        &request(&fixture, vec![0], 12, 9, 30),
        at(4, 8, 0),
    );

    assert_matches!(result, Err(AvailabilityError::Validation(_)));
    assert_eq!(service.list_templates(fixture.clinician.id).unwrap()[0].end_time.to_string(), "10:00:00");
    assert_eq!(slots(&fixture).len(), 2);
}

#[test]
fn sub_second_window_is_a_validation_error() {
    let fixture = AgendaFixture::new().unwrap();
    let mut half_second = request(&fixture, vec![0], 9, 9, 1);
    half_second.end_time = NaiveTime::from_hms_milli_opt(9, 0, 0, 500).unwrap();

    let result = service(&fixture).rewrite_availability_at(fixture.clinician.id, &half_second, at(4, 8, 0));

    assert_matches!(result, Err(AvailabilityError::Validation(_)));
    assert!(service(&fixture).list_templates(fixture.clinician.id).unwrap().is_empty());
}

#[test]
fn unknown_location_is_rejected() {
    let fixture = AgendaFixture::new().unwrap();
    let mut bad = request(&fixture, vec![0], 9, 10, 30);
    bad.location_id = Uuid::new_v4();

    let result = service(&fixture).rewrite_availability_at(fixture.clinician.id, &bad, at(4, 8, 0));

    assert_matches!(result, Err(AvailabilityError::LocationNotFound(id)) if id == bad.location_id);
}

#[test]
fn failure_after_templates_were_replaced_rolls_everything_back() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);
    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0, 3], 9, 10, 30), at(4, 8, 0))
        .unwrap();
    let slots_before = slots(&fixture);

    // Passes validation, then the horizon overflows the calendar during generation.
    let mut oversized = request(&fixture, vec![2], 14, 16, 30);
    oversized.horizon_weeks = Some(u32::MAX);
    let result = service.rewrite_availability_at(fixture.clinician.id, &oversized, at(4, 8, 0));

    assert_matches!(result, Err(AvailabilityError::Validation(_)));
    let templates = service.list_templates(fixture.clinician.id).unwrap();
    assert_eq!(templates.iter().map(|t| t.day_of_week).collect::<Vec<_>>(), vec![0, 3]);
    let slots_after = slots(&fixture);
    assert_eq!(
        slots_after.iter().map(|s| s.id).collect::<Vec<_>>(),
        slots_before.iter().map(|s| s.id).collect::<Vec<_>>()
    );
}

#[test]
fn prune_keeps_booked_slots_and_respects_boundary() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);
    let mut two_weeks = request(&fixture, vec![0], 9, 11, 30);
    two_weeks.horizon_weeks = Some(2);
    service
        .rewrite_availability_at(fixture.clinician.id, &two_weeks, at(4, 8, 0))
        .unwrap();
    assert_eq!(slots(&fixture).len(), 8);

    let booked_next_week = slots(&fixture)
        .into_iter()
        .find(|s| s.start_at == at(11, 9, 30))
        .unwrap();
    book(&fixture, &booked_next_week);

    let deleted = service
        .prune_free_slots_at(fixture.clinician.id, Some(at(8, 0, 0)), false, at(4, 8, 0))
        .unwrap();

    assert_eq!(deleted, 3);
    let remaining = slots(&fixture);
    assert_eq!(remaining.len(), 5);
    assert!(remaining.iter().any(|s| s.id == booked_next_week.id));
}

#[test]
fn prune_with_cover_today_reaches_back_to_midnight() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);
    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 10, 30), at(4, 8, 0))
        .unwrap();

    let without = service
        .prune_free_slots_at(fixture.clinician.id, None, false, at(4, 12, 0))
        .unwrap();
    assert_eq!(without, 0);

    let with = service
        .prune_free_slots_at(fixture.clinician.id, None, true, at(4, 12, 0))
        .unwrap();
    assert_eq!(with, 2);
}

#[test]
fn free_slots_excludes_booked_and_rejects_empty_range() {
    let fixture = AgendaFixture::new().unwrap();
    let service = service(&fixture);
    service
        .rewrite_availability_at(fixture.clinician.id, &request(&fixture, vec![0], 9, 11, 30), at(4, 8, 0))
        .unwrap();
    let first = slots(&fixture).remove(0);
    book(&fixture, &first);

    let free = service
        .free_slots(fixture.clinician.id, at(4, 0, 0), at(5, 0, 0))
        .unwrap();
    assert_eq!(free.len(), 3);
    assert!(free.iter().all(|s| s.id != first.id));

    assert_matches!(
        service.free_slots(fixture.clinician.id, at(5, 0, 0), at(4, 0, 0)),
        Err(AvailabilityError::Validation(_))
    );
}

#[test]
fn unknown_clinician_cannot_be_rewritten() {
    let fixture = AgendaFixture::new().unwrap();
    let missing = Uuid::new_v4();
    let result = service(&fixture).rewrite_availability_at(missing, &request(&fixture, vec![0], 9, 10, 30), at(4, 8, 0));
    assert_matches!(result, Err(AvailabilityError::ClinicianNotFound(id)) if id == missing);
}
