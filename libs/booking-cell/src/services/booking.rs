// libs/booking-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{
    delete_booking, get_booking, get_patient, get_slot, get_status, insert_audit_record, insert_booking,
    list_audit_for_booking, list_statuses, slot_is_booked, update_booking_note, update_booking_slot,
    update_booking_status, Database,
};
use shared_models::agenda::{AuditAction, AuditRecord, Booking, BookingStatus};

use crate::error::BookingError;
use crate::services::audit::{
    cancel_detail, create_detail, reschedule_detail, status_change_detail, FieldChanges,
};

/// Claims slots for patients and moves bookings through their statuses.
///
/// Every mutation runs in one write transaction together with its audit row.
/// The transaction takes the store's write lock before its first read, so two
/// allocations racing for the same slot are serialized and the second one sees
/// the first one's booking.
#[derive(Debug, Clone)]
pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn allocate(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
        status_id: i64,
        actor: Uuid,
        reason: &str,
    ) -> Result<Booking, BookingError> {
        self.allocate_at(slot_id, patient_id, status_id, actor, reason, Utc::now())
    }

    pub fn allocate_at(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
        status_id: i64,
        actor: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        debug!("Allocating slot {} to patient {}", slot_id, patient_id);

        let booking = self.db.write(|tx| {
            if get_slot(tx, &slot_id)?.is_none() {
                return Err(BookingError::SlotNotFound(slot_id));
            }
            if get_patient(tx, &patient_id)?.is_none() {
                return Err(BookingError::PatientNotFound(patient_id));
            }
            let status = load_status(tx, status_id)?;

            if slot_is_booked(tx, &slot_id)? {
                warn!("Slot {} already booked, rejecting allocation for patient {}", slot_id, patient_id);
                return Err(BookingError::SlotAlreadyBooked(slot_id));
            }

            let booking = Booking {
                id: Uuid::new_v4(),
                slot_id,
                patient_id,
                status: status.clone(),
                reason: reason.to_string(),
                note: String::new(),
                created_by: actor,
                created_at: now,
                updated_at: now,
            };
            insert_booking(tx, &booking).map_err(|e| BookingError::from_insert(e, slot_id))?;
            insert_audit_record(
                tx,
                &booking.id,
                &actor,
                AuditAction::Create,
                &create_detail(reason, patient_id, &status),
                &now,
            )?;

            Ok(booking)
        })?;

        info!(booking_id = %booking.id, slot_id = %slot_id, patient_id = %patient_id, "Slot allocated");
        Ok(booking)
    }

    /// Remove the booking and free its slot. The audit row is written first and
    /// outlives the booking.
    pub fn cancel(&self, booking_id: Uuid, actor: Uuid) -> Result<(), BookingError> {
        self.cancel_at(booking_id, actor, Utc::now())
    }

    pub fn cancel_at(&self, booking_id: Uuid, actor: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        debug!("Cancelling booking {}", booking_id);

        let booking = self.db.write(|tx| {
            let booking = load_booking(tx, booking_id)?;
            insert_audit_record(tx, &booking.id, &actor, AuditAction::Cancel, &cancel_detail(&booking), &now)?;
            delete_booking(tx, &booking.id)?;
            Ok::<_, BookingError>(booking)
        })?;

        info!(booking_id = %booking_id, slot_id = %booking.slot_id, "Booking cancelled");
        Ok(())
    }

    pub fn change_status(&self, booking_id: Uuid, status_id: i64, actor: Uuid) -> Result<Booking, BookingError> {
        self.change_status_at(booking_id, status_id, actor, Utc::now())
    }

    /// Same status as stored is a no-op: nothing is written and no audit row is added.
    pub fn change_status_at(
        &self,
        booking_id: Uuid,
        status_id: i64,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        debug!("Changing status of booking {} to {}", booking_id, status_id);

        self.db.write(|tx| {
            let booking = load_booking(tx, booking_id)?;
            if booking.status.id == status_id {
                debug!("Booking {} already in status {}", booking_id, booking.status.name);
                return Ok(booking);
            }

            let next = load_status(tx, status_id)?;
            update_booking_status(tx, &booking_id, next.id, &now)?;
            insert_audit_record(
                tx,
                &booking_id,
                &actor,
                AuditAction::ChangeStatus,
                &status_change_detail(&booking.status, &next),
                &now,
            )?;

            info!(booking_id = %booking_id, before = %booking.status.name, after = %next.name, "Booking status changed");
            load_booking(tx, booking_id)
        })
    }

    pub fn update_status_and_note(
        &self,
        booking_id: Uuid,
        status_id: i64,
        note: &str,
        actor: Uuid,
    ) -> Result<Booking, BookingError> {
        self.update_status_and_note_at(booking_id, status_id, note, actor, Utc::now())
    }

    /// Persist whichever of status and note differ from the stored booking,
    /// with one audit row listing exactly those fields.
    pub fn update_status_and_note_at(
        &self,
        booking_id: Uuid,
        status_id: i64,
        note: &str,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        debug!("Updating booking {}", booking_id);

        self.db.write(|tx| {
            let booking = load_booking(tx, booking_id)?;

            let next_status = if booking.status.id == status_id {
                booking.status.clone()
            } else {
                load_status(tx, status_id)?
            };

            let mut changes = FieldChanges::default();
            changes.record("status", booking.status.name.as_str(), next_status.name.as_str());
            changes.record("note", booking.note.as_str(), note);

            if changes.is_empty() {
                debug!("Booking {} unchanged", booking_id);
                return Ok(booking);
            }

            if changes.contains("status") {
                update_booking_status(tx, &booking_id, next_status.id, &now)?;
            }
            if changes.contains("note") {
                update_booking_note(tx, &booking_id, note, &now)?;
            }
            insert_audit_record(tx, &booking_id, &actor, AuditAction::Update, &changes.into_detail(), &now)?;

            info!(booking_id = %booking_id, "Booking updated");
            load_booking(tx, booking_id)
        })
    }

    pub fn reschedule(
        &self,
        booking_id: Uuid,
        slot_id: Uuid,
        actor: Uuid,
        reason: &str,
    ) -> Result<Booking, BookingError> {
        self.reschedule_at(booking_id, slot_id, actor, reason, Utc::now())
    }

    /// Move a booking onto another free slot. Moving onto its own slot is a no-op.
    pub fn reschedule_at(
        &self,
        booking_id: Uuid,
        slot_id: Uuid,
        actor: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        debug!("Rescheduling booking {} to slot {}", booking_id, slot_id);

        self.db.write(|tx| {
            let booking = load_booking(tx, booking_id)?;
            if booking.slot_id == slot_id {
                return Ok(booking);
            }

            if get_slot(tx, &slot_id)?.is_none() {
                return Err(BookingError::SlotNotFound(slot_id));
            }
            if slot_is_booked(tx, &slot_id)? {
                warn!("Slot {} already booked, rejecting reschedule of {}", slot_id, booking_id);
                return Err(BookingError::SlotAlreadyBooked(slot_id));
            }

            update_booking_slot(tx, &booking_id, &slot_id, &now)
                .map_err(|e| BookingError::from_insert(e, slot_id))?;
            insert_audit_record(
                tx,
                &booking_id,
                &actor,
                AuditAction::Reschedule,
                &reschedule_detail(booking.slot_id, slot_id, reason),
                &now,
            )?;

            info!(booking_id = %booking_id, from = %booking.slot_id, to = %slot_id, "Booking rescheduled");
            load_booking(tx, booking_id)
        })
    }

    pub fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.db.read(|conn| load_booking(conn, booking_id))
    }

    /// Oldest first. Cancelled bookings keep their history; an id with neither a
    /// booking nor any history is NotFound.
    pub fn audit_trail(&self, booking_id: Uuid) -> Result<Vec<AuditRecord>, BookingError> {
        self.db.read(|conn| {
            let trail = list_audit_for_booking(conn, &booking_id)?;
            if trail.is_empty() && get_booking(conn, &booking_id)?.is_none() {
                return Err(BookingError::BookingNotFound(booking_id));
            }
            Ok(trail)
        })
    }

    pub fn list_statuses(&self) -> Result<Vec<BookingStatus>, BookingError> {
        Ok(self.db.read(list_statuses)?)
    }
}

fn load_booking(conn: &Connection, booking_id: Uuid) -> Result<Booking, BookingError> {
    get_booking(conn, &booking_id)?.ok_or(BookingError::BookingNotFound(booking_id))
}

fn load_status(conn: &Connection, status_id: i64) -> Result<BookingStatus, BookingError> {
    get_status(conn, status_id)?.ok_or(BookingError::StatusNotFound(status_id))
}
