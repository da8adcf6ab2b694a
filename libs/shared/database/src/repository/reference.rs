use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use shared_models::agenda::{Clinician, Location, Patient};

use super::get_uuid;
use crate::DatabaseError;

pub fn insert_clinician(conn: &Connection, clinician: &Clinician) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clinicians (id, full_name, active) VALUES (?1, ?2, ?3)",
        params![clinician.id.to_string(), clinician.full_name, clinician.active],
    )?;
    Ok(())
}

pub fn get_clinician(conn: &Connection, id: &Uuid) -> Result<Option<Clinician>, DatabaseError> {
    let clinician = conn
        .query_row(
            "SELECT id, full_name, active FROM clinicians WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(Clinician {
                    id: get_uuid(row, 0)?,
                    full_name: row.get(1)?,
                    active: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(clinician)
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, full_name) VALUES (?1, ?2)",
        params![patient.id.to_string(), patient.full_name],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, full_name FROM patients WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(Patient {
                    id: get_uuid(row, 0)?,
                    full_name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(patient)
}

pub fn insert_location(conn: &Connection, location: &Location) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO locations (id, name) VALUES (?1, ?2)",
        params![location.id.to_string(), location.name],
    )?;
    Ok(())
}

pub fn get_location(conn: &Connection, id: &Uuid) -> Result<Option<Location>, DatabaseError> {
    let location = conn
        .query_row(
            "SELECT id, name FROM locations WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(Location {
                    id: get_uuid(row, 0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(location)
}
