use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use shared_models::agenda::Slot;

use super::{encode_timestamp, get_parsed, get_timestamp, get_uuid};
use crate::DatabaseError;

const SLOT_COLUMNS: &str =
    "s.id, s.clinician_id, s.location_id, s.start_at, s.end_at, s.modality, s.capacity, s.notes, s.created_at";

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<Slot> {
    Ok(Slot {
        id: get_uuid(row, 0)?,
        clinician_id: get_uuid(row, 1)?,
        location_id: get_uuid(row, 2)?,
        start_at: get_timestamp(row, 3)?,
        end_at: get_timestamp(row, 4)?,
        modality: get_parsed(row, 5, "modality")?,
        capacity: row.get(6)?,
        notes: row.get(7)?,
        created_at: get_timestamp(row, 8)?,
    })
}

/// Bulk insert that skips rows colliding with an existing (clinician, start, end).
/// Returns how many rows were actually written.
pub fn insert_slots_ignoring_duplicates(conn: &Connection, slots: &[Slot]) -> Result<usize, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO slots
         (id, clinician_id, location_id, start_at, end_at, modality, capacity, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    let mut inserted = 0;
    for slot in slots {
        inserted += stmt.execute(params![
            slot.id.to_string(),
            slot.clinician_id.to_string(),
            slot.location_id.to_string(),
            encode_timestamp(&slot.start_at),
            encode_timestamp(&slot.end_at),
            slot.modality.as_str(),
            slot.capacity,
            slot.notes,
            encode_timestamp(&slot.created_at),
        ])?;
    }
    Ok(inserted)
}

pub fn get_slot(conn: &Connection, id: &Uuid) -> Result<Option<Slot>, DatabaseError> {
    let slot = conn
        .query_row(
            &format!("SELECT {SLOT_COLUMNS} FROM slots s WHERE s.id = ?1"),
            params![id.to_string()],
            slot_from_row,
        )
        .optional()?;
    Ok(slot)
}

/// Every slot of the clinician starting at or after `from`, booked or not.
pub fn list_slots_from(
    conn: &Connection,
    clinician_id: &Uuid,
    from: &DateTime<Utc>,
) -> Result<Vec<Slot>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SLOT_COLUMNS} FROM slots s
         WHERE s.clinician_id = ?1 AND s.start_at >= ?2
         ORDER BY s.start_at"
    ))?;
    let rows = stmt
        .query_map(params![clinician_id.to_string(), encode_timestamp(from)], slot_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Unbooked slots of the clinician with `from <= start < to`.
pub fn list_free_slots(
    conn: &Connection,
    clinician_id: &Uuid,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> Result<Vec<Slot>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SLOT_COLUMNS} FROM slots s
         LEFT JOIN bookings b ON b.slot_id = s.id
         WHERE s.clinician_id = ?1 AND s.start_at >= ?2 AND s.start_at < ?3 AND b.id IS NULL
         ORDER BY s.start_at"
    ))?;
    let rows = stmt
        .query_map(
            params![clinician_id.to_string(), encode_timestamp(from), encode_timestamp(to)],
            slot_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn slot_is_booked(conn: &Connection, slot_id: &Uuid) -> Result<bool, DatabaseError> {
    let booked = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM bookings WHERE slot_id = ?1)",
        params![slot_id.to_string()],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(booked)
}

/// Delete the clinician's slots starting at or after `from` that no booking references.
pub fn delete_free_slots_from(
    conn: &Connection,
    clinician_id: &Uuid,
    from: &DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM slots
         WHERE clinician_id = ?1 AND start_at >= ?2
           AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.slot_id = slots.id)",
        params![clinician_id.to_string(), encode_timestamp(from)],
    )?;
    Ok(deleted)
}
