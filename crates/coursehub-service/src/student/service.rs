//! Student administration.

use std::sync::Arc;

use tracing::{info, warn};

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::StudentId;
use coursehub_database::store::StudentStore;
use coursehub_entity::course::Course;
use coursehub_entity::student::{CreateStudent, Student, UpdateStudent};

use crate::stock::StockService;

/// Student CRUD service.
#[derive(Debug, Clone)]
pub struct StudentService {
    /// Student persistence.
    students: Arc<dyn StudentStore>,
    /// Used to hand back seats of deleted students.
    stock: StockService,
}

impl StudentService {
    /// Creates a new student service.
    pub fn new(students: Arc<dyn StudentStore>, stock: StockService) -> Self {
        Self { students, stock }
    }

    /// Lists every student.
    pub async fn list(&self) -> AppResult<Vec<Student>> {
        self.students.find_all().await
    }

    /// Gets a single student.
    pub async fn get(&self, id: StudentId) -> AppResult<Student> {
        self.students
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {id} not found")))
    }

    /// Courses the student is enrolled in.
    pub async fn courses(&self, id: StudentId) -> AppResult<Vec<Course>> {
        self.get(id).await?;
        self.students.find_courses(id).await
    }

    /// Registers a student.
    pub async fn create(&self, input: CreateStudent) -> AppResult<Student> {
        let student = self.students.create(&input).await?;
        info!(student_id = %student.id, "Student created");
        Ok(student)
    }

    /// Replaces a student's fields.
    pub async fn update(&self, id: StudentId, input: UpdateStudent) -> AppResult<Student> {
        let student = self
            .students
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {id} not found")))?;
        info!(student_id = %id, "Student updated");
        Ok(student)
    }

    /// Deletes a student and returns their seats to each course's stock.
    pub async fn delete(&self, id: StudentId) -> AppResult<()> {
        let released = self
            .students
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {id} not found")))?;

        for course_id in &released {
            if let Err(e) = self.stock.release_seat(*course_id).await {
                warn!(
                    student_id = %id,
                    course_id = %course_id,
                    error = %e,
                    "Failed to return seat to stock counter"
                );
            }
        }

        info!(student_id = %id, released = released.len(), "Student deleted");
        Ok(())
    }
}
