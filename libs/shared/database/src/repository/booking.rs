use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use shared_models::agenda::{Booking, BookingStatus};

use super::{encode_timestamp, get_timestamp, get_uuid};
use crate::DatabaseError;

pub fn insert_booking(conn: &Connection, booking: &Booking) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO bookings
         (id, slot_id, patient_id, status_id, reason, note, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id.to_string(),
            booking.slot_id.to_string(),
            booking.patient_id.to_string(),
            booking.status.id,
            booking.reason,
            booking.note,
            booking.created_by.to_string(),
            encode_timestamp(&booking.created_at),
            encode_timestamp(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &Uuid) -> Result<Option<Booking>, DatabaseError> {
    let booking = conn
        .query_row(
            "SELECT b.id, b.slot_id, b.patient_id, st.id, st.name, b.reason, b.note,
                    b.created_by, b.created_at, b.updated_at
             FROM bookings b
             JOIN booking_statuses st ON st.id = b.status_id
             WHERE b.id = ?1",
            params![id.to_string()],
            |row| {
                Ok(Booking {
                    id: get_uuid(row, 0)?,
                    slot_id: get_uuid(row, 1)?,
                    patient_id: get_uuid(row, 2)?,
                    status: BookingStatus {
                        id: row.get(3)?,
                        name: row.get(4)?,
                    },
                    reason: row.get(5)?,
                    note: row.get(6)?,
                    created_by: get_uuid(row, 7)?,
                    created_at: get_timestamp(row, 8)?,
                    updated_at: get_timestamp(row, 9)?,
                })
            },
        )
        .optional()?;
    Ok(booking)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &Uuid,
    status_id: i64,
    updated_at: &DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE bookings SET status_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), status_id, encode_timestamp(updated_at)],
    )?;
    Ok(updated)
}

pub fn update_booking_note(
    conn: &Connection,
    id: &Uuid,
    note: &str,
    updated_at: &DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE bookings SET note = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), note, encode_timestamp(updated_at)],
    )?;
    Ok(updated)
}

pub fn update_booking_slot(
    conn: &Connection,
    id: &Uuid,
    slot_id: &Uuid,
    updated_at: &DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE bookings SET slot_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), slot_id.to_string(), encode_timestamp(updated_at)],
    )?;
    Ok(updated)
}

pub fn delete_booking(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id.to_string()])?;
    Ok(deleted)
}
