//! Student entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::StudentId;

/// A student who can select courses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Unique student identifier.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Institution-issued student number (unique).
    pub student_number: String,
    /// Contact email.
    pub email: String,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudent {
    /// Full name.
    pub name: String,
    /// Student number.
    pub student_number: String,
    /// Contact email.
    pub email: String,
}

/// Full replacement of a student's editable fields.
pub type UpdateStudent = CreateStudent;
