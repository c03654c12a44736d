//! Course administration: CRUD that keeps the stock counter in step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::CourseId;
use coursehub_database::store::{CourseStore, CourseUpdate};
use coursehub_entity::course::{Course, CreateCourse, UpdateCourse};

use crate::stock::StockService;

/// Course CRUD service.
#[derive(Debug, Clone)]
pub struct CourseService {
    /// Course persistence.
    courses: Arc<dyn CourseStore>,
    /// Stock counter maintenance.
    stock: StockService,
}

impl CourseService {
    /// Creates a new course service.
    pub fn new(courses: Arc<dyn CourseStore>, stock: StockService) -> Self {
        Self { courses, stock }
    }

    /// Lists every course.
    pub async fn list(&self) -> AppResult<Vec<Course>> {
        self.courses.find_all().await
    }

    /// Gets a single course.
    pub async fn get(&self, id: CourseId) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id} not found")))
    }

    /// Creates a course and seeds its stock counter.
    pub async fn create(&self, input: CreateCourse) -> AppResult<Course> {
        input.check_invariants()?;
        let course = self.courses.create(&input).await?;
        self.stock
            .set_stock(course.id, i64::from(course.available_seats))
            .await?;

        info!(course_id = %course.id, name = %course.name, "Course created");
        Ok(course)
    }

    /// Replaces a course's fields and overwrites its stock counter with the
    /// new `available_seats`.
    ///
    /// With `expected_updated_at`, a row modified since the caller read it
    /// is a conflict; a row that no longer exists is not found.
    pub async fn update(
        &self,
        id: CourseId,
        input: UpdateCourse,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Course> {
        input.check_invariants()?;
        let course = match self.courses.update(id, &input, expected_updated_at).await? {
            CourseUpdate::Updated(course) => course,
            CourseUpdate::NotFound => {
                return Err(AppError::not_found(format!("Course {id} not found")));
            }
            CourseUpdate::Conflict => {
                return Err(AppError::conflict(format!(
                    "Course {id} was modified concurrently"
                )));
            }
        };

        self.stock
            .set_stock(course.id, i64::from(course.available_seats))
            .await?;
        info!(course_id = %course.id, "Course updated");
        Ok(course)
    }

    /// Deletes a course, its enrollments, and its stock counter.
    pub async fn delete(&self, id: CourseId) -> AppResult<()> {
        if !self.courses.delete(id).await? {
            return Err(AppError::not_found(format!("Course {id} not found")));
        }
        self.stock.remove_stock(id).await?;
        info!(course_id = %id, "Course deleted");
        Ok(())
    }
}
