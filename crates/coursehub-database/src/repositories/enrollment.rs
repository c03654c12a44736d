//! Enrollment repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::enrollment::Enrollment;

use super::{db_error, is_unique_violation, violated_constraint};
use crate::store::{EnrollWrite, EnrollmentStore};

const STUDENT_FKEY: &str = "enrollments_student_fkey";
const COURSE_FKEY: &str = "enrollments_course_fkey";

/// Repository for enrollment rows and the seat bookkeeping that goes with them.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all enrollments for a course.
    pub async fn find_by_course(&self, course_id: CourseId) -> AppResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE course_id = $1 ORDER BY enrollment_date",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list course enrollments"))
    }
}

#[async_trait]
impl EnrollmentStore for EnrollmentRepository {
    async fn find(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find enrollment"))
    }

    async fn exists(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check enrollment existence"))
    }

    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        at: DateTime<Utc>,
    ) -> AppResult<EnrollWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let inserted = sqlx::query_as::<_, Enrollment>(
            r#"INSERT INTO enrollments (student_id, course_id, enrollment_date)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(at)
        .fetch_one(&mut *tx)
        .await;

        // Dropping `tx` on an early return rolls it back.
        let enrollment = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Ok(EnrollWrite::Duplicate),
            Err(e) => match violated_constraint(&e) {
                Some(STUDENT_FKEY) => return Ok(EnrollWrite::StudentMissing),
                Some(COURSE_FKEY) => return Ok(EnrollWrite::CourseMissing),
                _ => return Err(db_error("Failed to insert enrollment")(e)),
            },
        };

        let decremented = sqlx::query_scalar::<_, CourseId>(
            r#"UPDATE courses
               SET available_seats = available_seats - 1, updated_at = NOW()
               WHERE id = $1 AND available_seats > 0
               RETURNING id"#,
        )
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to decrement available seats"))?;

        if decremented.is_none() {
            // The enrollment insert passed the course foreign key, so the row exists.
            return Ok(EnrollWrite::NoSeats);
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit enrollment"))?;
        Ok(EnrollWrite::Recorded(enrollment))
    }

    async fn withdraw(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let deleted = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete enrollment"))?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        let restored = sqlx::query(
            r#"UPDATE courses
               SET available_seats = available_seats + 1, updated_at = NOW()
               WHERE id = $1 AND available_seats < total_seats"#,
        )
        .bind(course_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to increment available seats"))?;
        if restored.rows_affected() == 0 {
            warn!(
                student_id = %student_id,
                course_id = %course_id,
                "Course already at full capacity, seat not restored"
            );
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit withdrawal"))?;
        Ok(true)
    }

    async fn count_by_course(&self, course_id: CourseId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count course enrollments"))
    }
}
