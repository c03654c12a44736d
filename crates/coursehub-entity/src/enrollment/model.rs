//! Enrollment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::{CourseId, StudentId};

/// A student's seat in a course.
///
/// At most one row exists per `(student_id, course_id)`; the pair is the
/// table's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// The enrolled student.
    pub student_id: StudentId,
    /// The course the seat belongs to.
    pub course_id: CourseId,
    /// When the selection succeeded.
    pub enrollment_date: DateTime<Utc>,
}
