//! HTTP request handlers.

pub mod course;
pub mod health;
pub mod selection;
pub mod student;

use validator::Validate;

use coursehub_core::error::AppError;

/// Run `validator` rules and map failures to a validation error.
pub(crate) fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Validation failed: {e}")))
}
