use rusqlite::{params, Connection, OptionalExtension};

use shared_models::agenda::BookingStatus;

use crate::DatabaseError;

pub fn list_statuses(conn: &Connection) -> Result<Vec<BookingStatus>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM booking_statuses ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(BookingStatus {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_status(conn: &Connection, id: i64) -> Result<Option<BookingStatus>, DatabaseError> {
    let status = conn
        .query_row(
            "SELECT id, name FROM booking_statuses WHERE id = ?1",
            params![id],
            |row| {
                Ok(BookingStatus {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(status)
}

pub fn get_status_by_name(conn: &Connection, name: &str) -> Result<Option<BookingStatus>, DatabaseError> {
    let status = conn
        .query_row(
            "SELECT id, name FROM booking_statuses WHERE name = ?1",
            params![name],
            |row| {
                Ok(BookingStatus {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(status)
}

/// Administrators may extend the catalog beyond the seeded states.
pub fn insert_status(conn: &Connection, name: &str) -> Result<BookingStatus, DatabaseError> {
    conn.execute("INSERT INTO booking_statuses (name) VALUES (?1)", params![name])?;
    Ok(BookingStatus {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}
