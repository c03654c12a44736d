//! Course entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::CourseId;

/// A course with a finite seat pool.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Course name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Capacity of the course.
    pub total_seats: i32,
    /// Seats not yet taken. Always within `0..=total_seats`.
    pub available_seats: i32,
    /// Start of the selection window (inclusive).
    pub selection_start_time: DateTime<Utc>,
    /// End of the selection window (inclusive).
    pub selection_end_time: DateTime<Utc>,
    /// Whether the course is offered.
    pub is_active: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Whether `now` lies within `[selection_start_time, selection_end_time]`.
    pub fn is_selection_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.selection_start_time && now <= self.selection_end_time
    }

    /// Number of seats currently taken.
    pub fn enrolled_seats(&self) -> i32 {
        self.total_seats - self.available_seats
    }
}

/// Data required to create a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    /// Course name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Capacity of the course.
    pub total_seats: i32,
    /// Initial free seats; defaults to `total_seats`.
    pub available_seats: Option<i32>,
    /// Start of the selection window.
    pub selection_start_time: DateTime<Utc>,
    /// End of the selection window.
    pub selection_end_time: DateTime<Utc>,
    /// Whether the course is offered.
    pub is_active: bool,
}

impl CreateCourse {
    /// The seat count the course starts with.
    pub fn initial_available_seats(&self) -> i32 {
        self.available_seats.unwrap_or(self.total_seats)
    }

    /// Check seat bounds and window ordering.
    pub fn check_invariants(&self) -> AppResult<()> {
        check_course_invariants(
            self.total_seats,
            self.initial_available_seats(),
            self.selection_start_time,
            self.selection_end_time,
        )
    }
}

/// Administrative replacement of a course's fields.
///
/// `available_seats` is written as given and the stock counter is overwritten
/// with it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourse {
    /// Course name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Capacity of the course.
    pub total_seats: i32,
    /// Free seats.
    pub available_seats: i32,
    /// Start of the selection window.
    pub selection_start_time: DateTime<Utc>,
    /// End of the selection window.
    pub selection_end_time: DateTime<Utc>,
    /// Whether the course is offered.
    pub is_active: bool,
}

impl UpdateCourse {
    /// Check seat bounds and window ordering.
    pub fn check_invariants(&self) -> AppResult<()> {
        check_course_invariants(
            self.total_seats,
            self.available_seats,
            self.selection_start_time,
            self.selection_end_time,
        )
    }
}

fn check_course_invariants(
    total_seats: i32,
    available_seats: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<()> {
    if total_seats < 0 {
        return Err(AppError::validation("total_seats must not be negative"));
    }
    if available_seats < 0 || available_seats > total_seats {
        return Err(AppError::validation(
            "available_seats must be between 0 and total_seats",
        ));
    }
    if start >= end {
        return Err(AppError::validation(
            "selection_start_time must be before selection_end_time",
        ));
    }
    Ok(())
}
