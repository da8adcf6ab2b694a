use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Clinician not found: {0}")]
    ClinicianNotFound(Uuid),

    #[error("Location not found: {0}")]
    LocationNotFound(Uuid),

    #[error("Invalid availability: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ClinicianNotFound(_) | AvailabilityError::LocationNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
