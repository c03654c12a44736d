//! Store traits consumed by the service layer.
//!
//! The Postgres repositories in [`crate::repositories`] are the production
//! implementations; [`crate::memory::MemoryDatabase`] backs the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::{Course, CreateCourse, UpdateCourse};
use coursehub_entity::enrollment::Enrollment;
use coursehub_entity::student::{CreateStudent, Student, UpdateStudent};

/// Outcome of an administrative course update.
#[derive(Debug, Clone)]
pub enum CourseUpdate {
    /// The row was written.
    Updated(Course),
    /// No course with that id exists (anymore).
    NotFound,
    /// The row exists but changed since the caller read it.
    Conflict,
}

/// Outcome of recording an enrollment.
///
/// Expected business outcomes are values; `Err` is reserved for store
/// failures.
#[derive(Debug, Clone)]
pub enum EnrollWrite {
    /// Enrollment row inserted and `available_seats` decremented.
    Recorded(Enrollment),
    /// A row for the pair already exists.
    Duplicate,
    /// The course row no longer exists.
    CourseMissing,
    /// The student row does not exist.
    StudentMissing,
    /// `available_seats` is already zero.
    NoSeats,
}

/// Course persistence.
#[async_trait]
pub trait CourseStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a course by id.
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>>;

    /// List every course ordered by id.
    async fn find_all(&self) -> AppResult<Vec<Course>>;

    /// Insert a course and return the stored row.
    async fn create(&self, input: &CreateCourse) -> AppResult<Course>;

    /// Replace a course's fields.
    ///
    /// When `expected_updated_at` is set, the write only applies if the row
    /// still carries that timestamp.
    async fn update(
        &self,
        id: CourseId,
        input: &UpdateCourse,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<CourseUpdate>;

    /// Delete a course (and, by cascade, its enrollments). Returns `true` if deleted.
    async fn delete(&self, id: CourseId) -> AppResult<bool>;
}

/// Student persistence.
#[async_trait]
pub trait StudentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a student by id.
    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>>;

    /// List every student ordered by id.
    async fn find_all(&self) -> AppResult<Vec<Student>>;

    /// Insert a student and return the stored row.
    async fn create(&self, input: &CreateStudent) -> AppResult<Student>;

    /// Replace a student's fields. Returns `None` if the student does not exist.
    async fn update(&self, id: StudentId, input: &UpdateStudent) -> AppResult<Option<Student>>;

    /// Delete a student and give back the seats they held.
    ///
    /// Returns the courses whose `available_seats` were incremented, or
    /// `None` if the student does not exist.
    async fn delete(&self, id: StudentId) -> AppResult<Option<Vec<CourseId>>>;

    /// Courses the student is enrolled in, ordered by course id.
    async fn find_courses(&self, id: StudentId) -> AppResult<Vec<Course>>;
}

/// Enrollment persistence.
#[async_trait]
pub trait EnrollmentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find the enrollment for a pair.
    async fn find(&self, student_id: StudentId, course_id: CourseId)
    -> AppResult<Option<Enrollment>>;

    /// Whether an enrollment exists for the pair.
    async fn exists(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        Ok(self.find(student_id, course_id).await?.is_some())
    }

    /// Insert the enrollment row and decrement the course's
    /// `available_seats` in a single transaction.
    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        at: DateTime<Utc>,
    ) -> AppResult<EnrollWrite>;

    /// Delete the enrollment row and increment the course's
    /// `available_seats` in a single transaction. Returns `false` if no row
    /// existed.
    async fn withdraw(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool>;

    /// Number of enrollments for a course.
    async fn count_by_course(&self, course_id: CourseId) -> AppResult<i64>;
}
