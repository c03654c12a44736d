//! Course repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::CourseId;
use coursehub_entity::course::{Course, CreateCourse, UpdateCourse};

use super::{db_error, violated_constraint};
use crate::store::{CourseStore, CourseUpdate};

/// Repository for course CRUD operations.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: CourseId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check course existence"))
    }
}

/// Map CHECK constraint violations to validation errors.
fn map_write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match violated_constraint(&e) {
        Some(name) if name.starts_with("courses_") => AppError::with_source(
            ErrorKind::Validation,
            format!("Course violates constraint {name}"),
            e,
        ),
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

#[async_trait]
impl CourseStore for CourseRepository {
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find course by id"))
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list courses"))
    }

    async fn create(&self, input: &CreateCourse) -> AppResult<Course> {
        sqlx::query_as::<_, Course>(
            r#"INSERT INTO courses
               (name, description, total_seats, available_seats,
                selection_start_time, selection_end_time, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.total_seats)
        .bind(input.initial_available_seats())
        .bind(input.selection_start_time)
        .bind(input.selection_end_time)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error("Failed to create course"))
    }

    async fn update(
        &self,
        id: CourseId,
        input: &UpdateCourse,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<CourseUpdate> {
        let updated = sqlx::query_as::<_, Course>(
            r#"UPDATE courses SET
                   name = $2,
                   description = $3,
                   total_seats = $4,
                   available_seats = $5,
                   selection_start_time = $6,
                   selection_end_time = $7,
                   is_active = $8,
                   updated_at = NOW()
               WHERE id = $1 AND ($9::timestamptz IS NULL OR updated_at = $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.total_seats)
        .bind(input.available_seats)
        .bind(input.selection_start_time)
        .bind(input.selection_end_time)
        .bind(input.is_active)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error("Failed to update course"))?;

        match updated {
            Some(course) => Ok(CourseUpdate::Updated(course)),
            None if self.exists(id).await? => Ok(CourseUpdate::Conflict),
            None => Ok(CourseUpdate::NotFound),
        }
    }

    async fn delete(&self, id: CourseId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete course"))?;
        Ok(result.rows_affected() > 0)
    }
}
