//! Select / cancel orchestration.
//!
//! Cross-request coordination goes exclusively through the shared course
//! lock and stock counter, never through in-process state, so any number
//! of server instances can run this against the same cache and database.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use coursehub_cache::{CourseLock, LockGuard, SeatHold, StockCounter};
use coursehub_core::error::AppError;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_database::store::{CourseStore, EnrollWrite, EnrollmentStore};

use super::outcome::{Operation, SelectionRejection, SelectionSuccess, Stage};

type Outcome = Result<SelectionSuccess, SelectionRejection>;

/// Identifies one select or cancel request in logs and rejections.
#[derive(Debug, Clone, Copy)]
struct Request {
    operation: Operation,
    student_id: StudentId,
    course_id: CourseId,
}

impl Request {
    /// Log the full cause and turn it into an opaque rejection.
    fn internal(self, stage: Stage, err: AppError) -> SelectionRejection {
        error!(
            operation = %self.operation,
            stage = %stage,
            student_id = %self.student_id,
            course_id = %self.course_id,
            error = %err,
            source = ?std::error::Error::source(&err),
            "Course selection failed unexpectedly"
        );
        SelectionRejection::Internal {
            operation: self.operation,
            stage,
            student_id: self.student_id,
            course_id: self.course_id,
        }
    }

    fn success(self, remaining_stock: i64) -> SelectionSuccess {
        SelectionSuccess {
            operation: self.operation,
            student_id: self.student_id,
            course_id: self.course_id,
            remaining_stock,
        }
    }
}

/// Runs the select and cancel state machines.
#[derive(Debug, Clone)]
pub struct SelectionService {
    /// Course lookups.
    courses: Arc<dyn CourseStore>,
    /// Enrollment rows and seat bookkeeping.
    enrollments: Arc<dyn EnrollmentStore>,
    /// Fast-path seat counter.
    stock: StockCounter,
    /// Per-course lock.
    locks: CourseLock,
}

impl SelectionService {
    /// Creates a new selection service.
    pub fn new(
        courses: Arc<dyn CourseStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        stock: StockCounter,
        locks: CourseLock,
    ) -> Self {
        Self {
            courses,
            enrollments,
            stock,
            locks,
        }
    }

    /// Take a seat in `course_id` for `student_id`.
    ///
    /// Validation happens before the lock. Under the lock the stock counter
    /// is checked, decremented (and compensated if it went negative), then
    /// the enrollment and seat count are persisted together.
    pub async fn select(&self, student_id: StudentId, course_id: CourseId) -> Outcome {
        let req = Request {
            operation: Operation::Select,
            student_id,
            course_id,
        };

        let course = self
            .courses
            .find_by_id(course_id)
            .await
            .map_err(|e| req.internal(Stage::LoadCourse, e))?
            .ok_or(SelectionRejection::CourseNotFound)?;

        if !course.is_selection_open(Utc::now()) {
            debug!(course_id = %course_id, student_id = %student_id, "Selection window closed");
            return Err(SelectionRejection::WindowClosed);
        }

        let enrolled = self
            .enrollments
            .exists(student_id, course_id)
            .await
            .map_err(|e| req.internal(Stage::CheckDuplicate, e))?;
        if enrolled {
            return Err(SelectionRejection::AlreadyEnrolled);
        }

        let guard = self.lock(req).await?;
        let outcome = self.select_locked(req).await;
        self.unlock(req, guard).await;

        if outcome.is_ok() {
            info!(course_id = %course_id, student_id = %student_id, "Course selected");
        }
        outcome
    }

    /// Give back `student_id`'s seat in `course_id`.
    pub async fn cancel(&self, student_id: StudentId, course_id: CourseId) -> Outcome {
        let req = Request {
            operation: Operation::Cancel,
            student_id,
            course_id,
        };

        let enrollment = self
            .enrollments
            .find(student_id, course_id)
            .await
            .map_err(|e| req.internal(Stage::LoadEnrollment, e))?;
        if enrollment.is_none() {
            return Err(SelectionRejection::NotEnrolled);
        }

        let guard = self.lock(req).await?;
        let outcome = self.cancel_locked(req).await;
        self.unlock(req, guard).await;

        if outcome.is_ok() {
            info!(course_id = %course_id, student_id = %student_id, "Course selection cancelled");
        }
        outcome
    }

    async fn select_locked(&self, req: Request) -> Outcome {
        let course_id = req.course_id;

        let stock = self
            .stock
            .get(course_id)
            .await
            .map_err(|e| req.internal(Stage::CheckStock, e))?;
        if stock <= 0 {
            return Err(SelectionRejection::Full);
        }

        // Dropping the hold, including when this future is cancelled,
        // returns the seat to the counter.
        let hold = self
            .stock
            .take(course_id)
            .await
            .map_err(|e| req.internal(Stage::DecrementStock, e))?;
        let remaining = hold.remaining();
        if remaining < 0 {
            warn!(course_id = %course_id, remaining, "Stock counter went negative, compensating");
            self.restore_stock(req, hold).await;
            return Err(SelectionRejection::Full);
        }

        let write = self
            .enrollments
            .enroll(req.student_id, course_id, Utc::now())
            .await;

        let rejection = match write {
            Ok(EnrollWrite::Recorded(_)) => {
                hold.commit();
                return Ok(req.success(remaining));
            }
            Ok(EnrollWrite::Duplicate) => SelectionRejection::AlreadyEnrolled,
            Ok(EnrollWrite::CourseMissing) => SelectionRejection::CourseNotFound,
            Ok(EnrollWrite::StudentMissing) => SelectionRejection::StudentNotFound,
            Ok(EnrollWrite::NoSeats) => {
                warn!(
                    course_id = %course_id,
                    counter = remaining + 1,
                    "Stock counter ahead of available seats in the database"
                );
                SelectionRejection::Full
            }
            Err(e) => req.internal(Stage::PersistEnrollment, e),
        };

        self.restore_stock(req, hold).await;
        Err(rejection)
    }

    async fn cancel_locked(&self, req: Request) -> Outcome {
        let removed = self
            .enrollments
            .withdraw(req.student_id, req.course_id)
            .await
            .map_err(|e| req.internal(Stage::RemoveEnrollment, e))?;
        if !removed {
            // Cancelled by a concurrent request between lookup and lock.
            return Err(SelectionRejection::NotEnrolled);
        }

        let remaining = self
            .stock
            .increment(req.course_id)
            .await
            .map_err(|e| req.internal(Stage::IncrementStock, e))?;
        Ok(req.success(remaining))
    }

    /// Undo a decrement whose seat was not taken.
    async fn restore_stock(&self, req: Request, hold: SeatHold) {
        if let Err(e) = hold.give_back().await {
            error!(
                operation = %req.operation,
                course_id = %req.course_id,
                error = %e,
                "Failed to compensate stock counter; re-initialize it from the database"
            );
        }
    }

    async fn lock(&self, req: Request) -> Result<LockGuard, SelectionRejection> {
        self.locks
            .try_acquire(req.course_id)
            .await
            .map_err(|e| req.internal(Stage::AcquireLock, e))?
            .ok_or_else(|| {
                debug!(
                    operation = %req.operation,
                    course_id = %req.course_id,
                    student_id = %req.student_id,
                    "Course lock busy"
                );
                SelectionRejection::Busy
            })
    }

    async fn unlock(&self, req: Request, guard: LockGuard) {
        if guard.is_expired() {
            warn!(
                operation = %req.operation,
                course_id = %req.course_id,
                held_ms = u64::try_from(guard.elapsed().as_millis()).unwrap_or(u64::MAX),
                ttl_ms = u64::try_from(self.locks.ttl().as_millis()).unwrap_or(u64::MAX),
                "Critical section outlived the course lock"
            );
        }
        if let Err(e) = guard.release().await {
            // The entry still expires on its own.
            warn!(course_id = %req.course_id, error = %e, "Failed to release course lock");
        }
    }
}
