use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use uuid::Uuid;

use shared_models::agenda::{AuditAction, AuditRecord};

use super::{encode_timestamp, get_parsed, get_timestamp, get_uuid};
use crate::DatabaseError;

/// Append one audit row. The table rejects updates and deletes.
pub fn insert_audit_record(
    conn: &Connection,
    booking_id: &Uuid,
    actor_id: &Uuid,
    action: AuditAction,
    detail: &Value,
    created_at: &DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO booking_audit (booking_id, actor_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            booking_id.to_string(),
            actor_id.to_string(),
            action.as_str(),
            serde_json::to_string(detail)?,
            encode_timestamp(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// History of one booking, oldest first. Still readable after the booking is cancelled.
pub fn list_audit_for_booking(conn: &Connection, booking_id: &Uuid) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, actor_id, action, detail, created_at FROM booking_audit
         WHERE booking_id = ?1
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![booking_id.to_string()], |row| {
            let raw_detail: String = row.get(4)?;
            let detail = serde_json::from_str(&raw_detail).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(AuditRecord {
                id: row.get(0)?,
                booking_id: get_uuid(row, 1)?,
                actor_id: get_uuid(row, 2)?,
                action: get_parsed::<AuditAction>(row, 3, "action")?,
                detail,
                created_at: get_timestamp(row, 5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
