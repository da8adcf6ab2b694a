use rusqlite::{params, Connection};
use uuid::Uuid;

use shared_models::agenda::AvailabilityTemplate;

use super::{encode_time, encode_timestamp, get_parsed, get_time, get_timestamp, get_uuid};
use crate::DatabaseError;

const TEMPLATE_COLUMNS: &str = "id, clinician_id, day_of_week, start_time, end_time, duration_minutes,
     modality, location_id, active, created_at";

pub fn insert_templates(conn: &Connection, templates: &[AvailabilityTemplate]) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO availability_templates
         (id, clinician_id, day_of_week, start_time, end_time, duration_minutes,
          modality, location_id, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for template in templates {
        stmt.execute(params![
            template.id.to_string(),
            template.clinician_id.to_string(),
            template.day_of_week,
            encode_time(&template.start_time),
            encode_time(&template.end_time),
            template.duration_minutes,
            template.modality.as_str(),
            template.location_id.to_string(),
            template.active,
            encode_timestamp(&template.created_at),
        ])?;
    }
    Ok(())
}

pub fn delete_templates_for_clinician(conn: &Connection, clinician_id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM availability_templates WHERE clinician_id = ?1",
        params![clinician_id.to_string()],
    )?;
    Ok(deleted)
}

pub fn list_templates(conn: &Connection, clinician_id: &Uuid) -> Result<Vec<AvailabilityTemplate>, DatabaseError> {
    query_templates(
        conn,
        &format!(
            "SELECT {TEMPLATE_COLUMNS} FROM availability_templates
             WHERE clinician_id = ?1 ORDER BY day_of_week, start_time"
        ),
        clinician_id,
    )
}

pub fn list_active_templates(
    conn: &Connection,
    clinician_id: &Uuid,
) -> Result<Vec<AvailabilityTemplate>, DatabaseError> {
    query_templates(
        conn,
        &format!(
            "SELECT {TEMPLATE_COLUMNS} FROM availability_templates
             WHERE clinician_id = ?1 AND active = 1 ORDER BY day_of_week, start_time"
        ),
        clinician_id,
    )
}

fn query_templates(
    conn: &Connection,
    sql: &str,
    clinician_id: &Uuid,
) -> Result<Vec<AvailabilityTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![clinician_id.to_string()], |row| {
            Ok(AvailabilityTemplate {
                id: get_uuid(row, 0)?,
                clinician_id: get_uuid(row, 1)?,
                day_of_week: row.get(2)?,
                start_time: get_time(row, 3)?,
                end_time: get_time(row, 4)?,
                duration_minutes: row.get(5)?,
                modality: get_parsed(row, 6, "modality")?,
                location_id: get_uuid(row, 7)?,
                active: row.get(8)?,
                created_at: get_timestamp(row, 9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
