//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::{CreateCourse, UpdateCourse};
use coursehub_entity::student::CreateStudent;

fn default_active() -> bool {
    true
}

/// Create course request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_course"))]
pub struct CreateCourseRequest {
    /// Course name.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Capacity.
    #[validate(range(min = 0, message = "Total seats must not be negative"))]
    pub total_seats: i32,
    /// Initial free seats; defaults to `total_seats`.
    pub available_seats: Option<i32>,
    /// Selection window start.
    pub selection_start_time: DateTime<Utc>,
    /// Selection window end.
    pub selection_end_time: DateTime<Utc>,
    /// Whether the course is offered.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn validate_create_course(req: &CreateCourseRequest) -> Result<(), ValidationError> {
    let available = req.available_seats.unwrap_or(req.total_seats);
    check_seats_and_window(
        req.total_seats,
        available,
        req.selection_start_time,
        req.selection_end_time,
    )
}

impl From<CreateCourseRequest> for CreateCourse {
    fn from(req: CreateCourseRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            total_seats: req.total_seats,
            available_seats: req.available_seats,
            selection_start_time: req.selection_start_time,
            selection_end_time: req.selection_end_time,
            is_active: req.is_active,
        }
    }
}

/// Update course request.
///
/// `expected_updated_at`, when given, must match the stored row's
/// `updated_at`; otherwise the update is rejected as a conflict.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_course"))]
pub struct UpdateCourseRequest {
    /// Course name.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Capacity.
    #[validate(range(min = 0, message = "Total seats must not be negative"))]
    pub total_seats: i32,
    /// Free seats; also written to the stock counter.
    pub available_seats: i32,
    /// Selection window start.
    pub selection_start_time: DateTime<Utc>,
    /// Selection window end.
    pub selection_end_time: DateTime<Utc>,
    /// Whether the course is offered.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Optimistic concurrency token.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

fn validate_update_course(req: &UpdateCourseRequest) -> Result<(), ValidationError> {
    check_seats_and_window(
        req.total_seats,
        req.available_seats,
        req.selection_start_time,
        req.selection_end_time,
    )
}

impl UpdateCourseRequest {
    /// Split into the entity payload and the concurrency token.
    pub fn into_parts(self) -> (UpdateCourse, Option<DateTime<Utc>>) {
        (
            UpdateCourse {
                name: self.name,
                description: self.description,
                total_seats: self.total_seats,
                available_seats: self.available_seats,
                selection_start_time: self.selection_start_time,
                selection_end_time: self.selection_end_time,
                is_active: self.is_active,
            },
            self.expected_updated_at,
        )
    }
}

fn check_seats_and_window(
    total: i32,
    available: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if available < 0 || available > total {
        let mut err = ValidationError::new("available_seats_range");
        err.message = Some("Available seats must be between 0 and total seats".into());
        return Err(err);
    }
    if start >= end {
        let mut err = ValidationError::new("selection_window");
        err.message = Some("Selection start must be before selection end".into());
        return Err(err);
    }
    Ok(())
}

/// Create or replace a student.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StudentRequest {
    /// Full name.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Student number.
    #[validate(length(min = 1, max = 64, message = "Student number must be 1-64 characters"))]
    pub student_number: String,
    /// Contact email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

impl From<StudentRequest> for CreateStudent {
    fn from(req: StudentRequest) -> Self {
        Self {
            name: req.name,
            student_number: req.student_number,
            email: req.email,
        }
    }
}

/// Body of select and cancel calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Acting student.
    pub student_id: StudentId,
    /// Target course.
    pub course_id: CourseId,
}

/// Administrative stock overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetStockRequest {
    /// New counter value.
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create(total: i32, available: Option<i32>) -> CreateCourseRequest {
        let start = Utc::now();
        CreateCourseRequest {
            name: "Networks".to_string(),
            description: String::new(),
            total_seats: total,
            available_seats: available,
            selection_start_time: start,
            selection_end_time: start + Duration::days(3),
            is_active: true,
        }
    }

    #[test]
    fn test_course_validation() {
        assert!(create(10, None).validate().is_ok());
        assert!(create(10, Some(11)).validate().is_err());
        assert!(create(-1, None).validate().is_err());

        let mut empty_name = create(10, None);
        empty_name.name.clear();
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_student_email_validation() {
        let mut req = StudentRequest {
            name: "Ada".to_string(),
            student_number: "S1".to_string(),
            email: "ada@example.edu".to_string(),
        };
        assert!(req.validate().is_ok());
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_token_defaults_to_none() {
        let json = serde_json::json!({
            "name": "Networks",
            "total_seats": 10,
            "available_seats": 5,
            "selection_start_time": "2026-01-01T00:00:00Z",
            "selection_end_time": "2026-02-01T00:00:00Z"
        });
        let req: UpdateCourseRequest = serde_json::from_value(json).unwrap();
        assert!(req.is_active);
        let (update, token) = req.into_parts();
        assert_eq!(update.available_seats, 5);
        assert!(token.is_none());
    }
}
