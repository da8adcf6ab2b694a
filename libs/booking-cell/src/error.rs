use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Slot not found: {0}")]
    SlotNotFound(Uuid),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Booking status not found: {0}")]
    StatusNotFound(i64),

    #[error("slot already booked")]
    SlotAlreadyBooked(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl BookingError {
    /// A UNIQUE(slot_id) violation means another transaction claimed the slot first.
    pub(crate) fn from_insert(err: DatabaseError, slot_id: Uuid) -> Self {
        let constraint_violation = matches!(
            &err,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        );
        if constraint_violation {
            BookingError::SlotAlreadyBooked(slot_id)
        } else {
            BookingError::Database(err)
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SlotNotFound(_)
            | BookingError::BookingNotFound(_)
            | BookingError::PatientNotFound(_)
            | BookingError::StatusNotFound(_) => AppError::NotFound(err.to_string()),
            BookingError::SlotAlreadyBooked(_) => AppError::Conflict(err.to_string()),
            BookingError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
