//! PostgreSQL repository implementations for all CourseHub entities.

pub mod course;
pub mod enrollment;
pub mod student;

pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use student::StudentRepository;

use coursehub_core::error::{AppError, ErrorKind};

/// Name of the violated constraint, if the error is a constraint violation.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

/// Whether the error is a unique or primary-key violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Wrap a sqlx error into a database [`AppError`].
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}
