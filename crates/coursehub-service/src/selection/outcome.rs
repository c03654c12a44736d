//! Result types of the select / cancel flow.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coursehub_core::types::{CourseId, StudentId};

/// Which orchestrated operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Take a seat.
    Select,
    /// Give a seat back.
    Cancel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Step of the flow at which an internal failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Course lookup.
    LoadCourse,
    /// Duplicate-enrollment check.
    CheckDuplicate,
    /// Enrollment lookup before cancel.
    LoadEnrollment,
    /// Lock acquisition.
    AcquireLock,
    /// Stock counter read.
    CheckStock,
    /// Stock counter decrement.
    DecrementStock,
    /// Enrollment insert plus seat-count decrement.
    PersistEnrollment,
    /// Enrollment delete plus seat-count increment.
    RemoveEnrollment,
    /// Stock counter increment after a cancel.
    IncrementStock,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadCourse => "load_course",
            Self::CheckDuplicate => "check_duplicate",
            Self::LoadEnrollment => "load_enrollment",
            Self::AcquireLock => "acquire_lock",
            Self::CheckStock => "check_stock",
            Self::DecrementStock => "decrement_stock",
            Self::PersistEnrollment => "persist_enrollment",
            Self::RemoveEnrollment => "remove_enrollment",
            Self::IncrementStock => "increment_stock",
        };
        f.write_str(name)
    }
}

/// Coarse class of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCategory {
    /// Detected before any lock or mutation.
    Validation,
    /// The course lock is held by someone else; retry later.
    Contention,
    /// No seats left.
    Capacity,
    /// Unexpected store or cache failure.
    Internal,
}

/// Why a select or cancel did not go through.
///
/// `Display` yields the caller-facing message. The `Internal` variant keeps
/// its context for logs but never exposes the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionRejection {
    /// No course with the requested id.
    #[error("course not found")]
    CourseNotFound,
    /// No student with the requested id.
    #[error("student not found")]
    StudentNotFound,
    /// Now is outside the course's selection window.
    #[error("not within the selection window")]
    WindowClosed,
    /// The student already holds a seat in the course.
    #[error("already enrolled in this course")]
    AlreadyEnrolled,
    /// Nothing to cancel.
    #[error("enrollment not found")]
    NotEnrolled,
    /// Another request holds the course lock.
    #[error("system busy, please retry later")]
    Busy,
    /// The stock counter is exhausted.
    #[error("course is full")]
    Full,
    /// Unexpected failure; details were logged.
    #[error("an error occurred while processing the request")]
    Internal {
        /// Operation being executed.
        operation: Operation,
        /// Step that failed.
        stage: Stage,
        /// Requesting student.
        student_id: StudentId,
        /// Target course.
        course_id: CourseId,
    },
}

impl SelectionRejection {
    /// Coarse class of this rejection.
    pub fn category(&self) -> RejectionCategory {
        match self {
            Self::CourseNotFound
            | Self::StudentNotFound
            | Self::WindowClosed
            | Self::AlreadyEnrolled
            | Self::NotEnrolled => RejectionCategory::Validation,
            Self::Busy => RejectionCategory::Contention,
            Self::Full => RejectionCategory::Capacity,
            Self::Internal { .. } => RejectionCategory::Internal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::StudentNotFound => "STUDENT_NOT_FOUND",
            Self::WindowClosed => "WINDOW_CLOSED",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::Busy => "BUSY",
            Self::Full => "FULL",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Internal { .. })
    }
}

/// A select or cancel that went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSuccess {
    /// Operation that succeeded.
    pub operation: Operation,
    /// Student that selected or cancelled.
    pub student_id: StudentId,
    /// Course concerned.
    pub course_id: CourseId,
    /// Stock counter value right after the operation.
    pub remaining_stock: i64,
}

impl SelectionSuccess {
    /// Caller-facing message.
    pub fn message(&self) -> &'static str {
        match self.operation {
            Operation::Select => "selection succeeded",
            Operation::Cancel => "cancellation succeeded",
        }
    }
}

/// The `(success, message)` pair handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReply {
    /// Whether the operation went through.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl From<&SelectionSuccess> for SelectionReply {
    fn from(success: &SelectionSuccess) -> Self {
        Self {
            success: true,
            message: success.message().to_string(),
        }
    }
}

impl From<&SelectionRejection> for SelectionReply {
    fn from(rejection: &SelectionRejection) -> Self {
        Self {
            success: false,
            message: rejection.to_string(),
        }
    }
}

impl From<&Result<SelectionSuccess, SelectionRejection>> for SelectionReply {
    fn from(result: &Result<SelectionSuccess, SelectionRejection>) -> Self {
        match result {
            Ok(success) => success.into(),
            Err(rejection) => rejection.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_message_hides_context() {
        let rejection = SelectionRejection::Internal {
            operation: Operation::Select,
            stage: Stage::PersistEnrollment,
            student_id: StudentId(4),
            course_id: CourseId(9),
        };
        let reply = SelectionReply::from(&rejection);
        assert!(!reply.success);
        assert_eq!(reply.message, "an error occurred while processing the request");
        assert_eq!(rejection.category(), RejectionCategory::Internal);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            SelectionRejection::WindowClosed.category(),
            RejectionCategory::Validation
        );
        assert_eq!(SelectionRejection::Busy.category(), RejectionCategory::Contention);
        assert_eq!(SelectionRejection::Full.category(), RejectionCategory::Capacity);
        assert!(SelectionRejection::Busy.is_retryable());
        assert!(!SelectionRejection::Full.is_retryable());
    }

    #[test]
    fn test_success_reply() {
        let success = SelectionSuccess {
            operation: Operation::Cancel,
            student_id: StudentId(1),
            course_id: CourseId(2),
            remaining_stock: 3,
        };
        let result: Result<SelectionSuccess, SelectionRejection> = Ok(success);
        let reply = SelectionReply::from(&result);
        assert_eq!(
            reply,
            SelectionReply {
                success: true,
                message: "cancellation succeeded".to_string(),
            }
        );
    }
}
