// libs/availability-cell/tests/generator_test.rs
use assert_matches::assert_matches;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use availability_cell::{AvailabilityError, AvailabilityService, GenerationReport};
use shared_database::{
    encode_timestamp, insert_booking, insert_slots_ignoring_duplicates, insert_templates, list_slots_from,
    DatabaseError,
};
use shared_models::agenda::{AvailabilityTemplate, Booking, Modality, Slot};
use shared_utils::test_utils::AgendaFixture;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    // March 2030: the 4th is a Monday.
    Utc.with_ymd_and_hms(2030, 3, day, hour, minute, 0).unwrap()
}

fn template(fixture: &AgendaFixture, day_of_week: u8, start: (u32, u32), end: (u32, u32), duration: u32) -> AvailabilityTemplate {
    AvailabilityTemplate {
        id: Uuid::new_v4(),
        clinician_id: fixture.clinician.id,
        day_of_week,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        duration_minutes: duration,
        modality: Modality::InPerson,
        location_id: fixture.location.id,
        active: true,
        created_at: at(1, 0, 0),
    }
}

fn store_templates(fixture: &AgendaFixture, templates: &[AvailabilityTemplate]) {
    fixture
        .db
        .write(|tx| insert_templates(tx, templates))
        .unwrap();
}

fn slots_from(fixture: &AgendaFixture, from: DateTime<Utc>) -> Vec<Slot> {
    fixture
        .db
        .read(|conn| list_slots_from(conn, &fixture.clinician.id, &from))
        .unwrap()
}

fn service(fixture: &AgendaFixture) -> AvailabilityService {
    AvailabilityService::with_timezone(fixture.db.clone(), Tz::UTC)
}

fn book_existing_slot(fixture: &AgendaFixture, start: DateTime<Utc>, end: DateTime<Utc>) -> Slot {
    let slot = Slot {
        id: Uuid::new_v4(),
        clinician_id: fixture.clinician.id,
        location_id: fixture.location.id,
        start_at: start,
        end_at: end,
        modality: Modality::InPerson,
        capacity: 1,
        notes: Some("booked by phone".to_string()),
        created_at: at(1, 0, 0),
    };
    let pending = fixture.status("Pending").unwrap();
    fixture
        .db
        .write(|tx| {
            insert_slots_ignoring_duplicates(tx, &[slot.clone()])?;
            insert_booking(
                tx,
                &Booking {
                    id: Uuid::new_v4(),
                    slot_id: slot.id,
                    patient_id: fixture.patient.id,
                    status: pending.clone(),
                    reason: String::new(),
                    note: String::new(),
                    created_by: fixture.actor,
                    created_at: at(1, 0, 0),
                    updated_at: at(1, 0, 0),
                },
            )?;
            Ok::<_, DatabaseError>(())
        })
        .unwrap();
    slot
}

#[test]
fn monday_morning_template_produces_two_half_hour_slots() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(&fixture, &[template(&fixture, 0, (9, 0), (10, 0), 30)]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    assert_eq!(report, GenerationReport { created: 2, skipped_past: 0, skipped_overlap: 0 });
    let slots = slots_from(&fixture, at(4, 0, 0));
    assert_eq!(slots.len(), 2);
    assert_eq!((slots[0].start_at, slots[0].end_at), (at(4, 9, 0), at(4, 9, 30)));
    assert_eq!((slots[1].start_at, slots[1].end_at), (at(4, 9, 30), at(4, 10, 0)));
    assert!(slots.iter().all(|s| s.location_id == fixture.location.id && s.capacity == 1));
}

#[test]
fn second_run_over_unchanged_state_creates_nothing() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(
        &fixture,
        &[
            template(&fixture, 0, (9, 0), (12, 0), 30),
            template(&fixture, 3, (14, 0), (16, 0), 45),
        ],
    );
    let service = service(&fixture);

    let first = service.generate_horizon_at(fixture.clinician.id, None, at(4, 8, 0)).unwrap();
    let second = service.generate_horizon_at(fixture.clinician.id, None, at(4, 8, 0)).unwrap();

    // 8 Mondays x 6 + 8 Thursdays x 2
    assert_eq!(first.created, 64);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped_overlap, 64);
    assert_eq!(slots_from(&fixture, at(4, 0, 0)).len(), 64);
}

#[test]
fn existing_booked_slot_blocks_overlapping_candidate() {
    let fixture = AgendaFixture::new().unwrap();
    let booked = book_existing_slot(&fixture, at(4, 10, 0), at(4, 10, 30));
    store_templates(&fixture, &[template(&fixture, 0, (10, 0), (11, 0), 30)]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    assert_eq!(report, GenerationReport { created: 1, skipped_past: 0, skipped_overlap: 1 });
    let slots = slots_from(&fixture, at(4, 0, 0));
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].id, booked.id);
    assert_eq!(slots[1].start_at, at(4, 10, 30));
}

#[test]
fn partially_overlapping_existing_slot_is_respected() {
    let fixture = AgendaFixture::new().unwrap();
    book_existing_slot(&fixture, at(4, 9, 15), at(4, 9, 45));
    store_templates(&fixture, &[template(&fixture, 0, (9, 0), (10, 0), 30)]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.skipped_overlap, 2);
}

#[test]
fn elapsed_candidates_are_skipped_as_past() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(&fixture, &[template(&fixture, 0, (13, 0), (15, 0), 30)]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 14, 0))
        .unwrap();

    // 13:00-13:30 and 13:30-14:00 have ended; 14:00-14:30 and 14:30-15:00 remain.
    assert_eq!(report, GenerationReport { created: 2, skipped_past: 2, skipped_overlap: 0 });
    let slots = slots_from(&fixture, at(4, 0, 0));
    assert_eq!(slots[0].start_at, at(4, 14, 0));
}

#[test]
fn templates_overlapping_each_other_do_not_produce_overlapping_slots() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(
        &fixture,
        &[
            template(&fixture, 0, (9, 0), (10, 0), 30),
            template(&fixture, 0, (9, 15), (10, 15), 30),
        ],
    );

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    assert_eq!(report, GenerationReport { created: 2, skipped_past: 0, skipped_overlap: 2 });
    let slots = slots_from(&fixture, at(4, 0, 0));
    for pair in slots.windows(2) {
        assert!(pair[0].end_at <= pair[1].start_at);
    }
}

#[test]
fn horizon_covers_requested_number_of_weeks() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(&fixture, &[template(&fixture, 2, (9, 0), (10, 0), 60)]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(3), at(4, 8, 0))
        .unwrap();

    assert_eq!(report.created, 3);
    let slots = slots_from(&fixture, at(4, 0, 0));
    assert_eq!(slots.last().unwrap().start_at, at(20, 9, 0));
}

#[test]
fn inactive_templates_are_ignored() {
    let fixture = AgendaFixture::new().unwrap();
    let mut inactive = template(&fixture, 0, (9, 0), (10, 0), 30);
    inactive.active = false;
    store_templates(&fixture, &[inactive]);

    let report = service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    assert_eq!(report, GenerationReport::default());
}

#[test]
fn slots_are_stored_at_second_precision() {
    let fixture = AgendaFixture::new().unwrap();
    store_templates(&fixture, &[template(&fixture, 0, (9, 0), (9, 30), 30)]);
    service(&fixture)
        .generate_horizon_at(fixture.clinician.id, Some(1), at(4, 8, 0))
        .unwrap();

    let stored: String = fixture
        .db
        .read(|conn| {
            conn.query_row("SELECT start_at FROM slots", [], |row| row.get(0))
                .map_err(DatabaseError::from)
        })
        .unwrap();
    assert_eq!(stored, encode_timestamp(&at(4, 9, 0)));
    assert_eq!(stored, "2030-03-04T09:00:00Z");
}

#[test]
fn unknown_clinician_is_not_found() {
    let fixture = AgendaFixture::new().unwrap();
    let missing = Uuid::new_v4();

    let result = service(&fixture).generate_horizon_at(missing, Some(1), at(4, 8, 0));

    assert_matches!(result, Err(AvailabilityError::ClinicianNotFound(id)) if id == missing);
}

#[test]
fn zero_week_horizon_is_rejected() {
    let fixture = AgendaFixture::new().unwrap();
    let result = service(&fixture).generate_horizon_at(fixture.clinician.id, Some(0), at(4, 8, 0));
    assert_matches!(result, Err(AvailabilityError::Validation(_)));
}
