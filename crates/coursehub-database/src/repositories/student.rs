//! Student repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::Course;
use coursehub_entity::student::{CreateStudent, Student, UpdateStudent};

use super::{db_error, is_unique_violation};
use crate::store::StudentStore;

/// Repository for student CRUD operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(
    input: &CreateStudent,
    context: &'static str,
) -> impl FnOnce(sqlx::Error) -> AppError {
    let number = input.student_number.clone();
    move |e| {
        if is_unique_violation(&e) {
            AppError::with_source(
                ErrorKind::Conflict,
                format!("Student number '{number}' is already registered"),
                e,
            )
        } else {
            AppError::with_source(ErrorKind::Database, context, e)
        }
    }
}

#[async_trait]
impl StudentStore for StudentRepository {
    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find student by id"))
    }

    async fn find_all(&self) -> AppResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list students"))
    }

    async fn create(&self, input: &CreateStudent) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(
            r#"INSERT INTO students (name, student_number, email)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(&input.name)
        .bind(&input.student_number)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error(input, "Failed to create student"))
    }

    async fn update(&self, id: StudentId, input: &UpdateStudent) -> AppResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            r#"UPDATE students SET
                   name = $2,
                   student_number = $3,
                   email = $4,
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.student_number)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error(input, "Failed to update student"))
    }

    async fn delete(&self, id: StudentId) -> AppResult<Option<Vec<CourseId>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let found = sqlx::query_scalar::<_, StudentId>(
            "SELECT id FROM students WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock student row"))?;
        if found.is_none() {
            return Ok(None);
        }

        let course_ids = sqlx::query_scalar::<_, CourseId>(
            "SELECT course_id FROM enrollments WHERE student_id = $1 ORDER BY course_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to list student enrollments"))?;

        let mut released = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            let restored = sqlx::query(
                r#"UPDATE courses
                   SET available_seats = available_seats + 1, updated_at = NOW()
                   WHERE id = $1 AND available_seats < total_seats"#,
            )
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to restore course seat"))?;

            if restored.rows_affected() > 0 {
                released.push(course_id);
            } else {
                warn!(
                    student_id = %id,
                    course_id = %course_id,
                    "Course already at full capacity, seat not restored"
                );
            }
        }

        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete student"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit student deletion"))?;
        Ok(Some(released))
    }

    async fn find_courses(&self, id: StudentId) -> AppResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(
            r#"SELECT c.* FROM courses c
               JOIN enrollments e ON e.course_id = c.id
               WHERE e.student_id = $1
               ORDER BY c.id"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list student courses"))
    }
}
