//! In-process store implementation.
//!
//! Mirrors the Postgres repositories closely enough for service and API
//! tests: one mutex guards all tables, so `enroll`, `withdraw` and student
//! deletion are atomic exactly like their transactional counterparts.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::{Course, CreateCourse, UpdateCourse};
use coursehub_entity::enrollment::Enrollment;
use coursehub_entity::student::{CreateStudent, Student, UpdateStudent};

use crate::store::{CourseStore, CourseUpdate, EnrollWrite, EnrollmentStore, StudentStore};

#[derive(Debug, Default)]
struct Tables {
    courses: BTreeMap<CourseId, Course>,
    students: BTreeMap<StudentId, Student>,
    enrollments: BTreeMap<(StudentId, CourseId), Enrollment>,
    next_course_id: i64,
    next_student_id: i64,
}

/// All three stores backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent enrollment write fail with a database error.
    pub fn fail_enrollment_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every enrollment row for a course.
    pub async fn enrollments_for(&self, course_id: CourseId) -> Vec<Enrollment> {
        let tables = self.tables.lock().await;
        tables
            .enrollments
            .values()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Simulated enrollment write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl CourseStore for MemoryDatabase {
    async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>> {
        Ok(self.tables.lock().await.courses.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Course>> {
        Ok(self.tables.lock().await.courses.values().cloned().collect())
    }

    async fn create(&self, input: &CreateCourse) -> AppResult<Course> {
        input.check_invariants()?;
        let mut tables = self.tables.lock().await;
        tables.next_course_id += 1;
        let now = Utc::now();
        let course = Course {
            id: CourseId(tables.next_course_id),
            name: input.name.clone(),
            description: input.description.clone(),
            total_seats: input.total_seats,
            available_seats: input.initial_available_seats(),
            selection_start_time: input.selection_start_time,
            selection_end_time: input.selection_end_time,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update(
        &self,
        id: CourseId,
        input: &UpdateCourse,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<CourseUpdate> {
        input.check_invariants()?;
        let mut tables = self.tables.lock().await;
        let Some(course) = tables.courses.get_mut(&id) else {
            return Ok(CourseUpdate::NotFound);
        };
        if expected_updated_at.is_some_and(|expected| expected != course.updated_at) {
            return Ok(CourseUpdate::Conflict);
        }

        course.name = input.name.clone();
        course.description = input.description.clone();
        course.total_seats = input.total_seats;
        course.available_seats = input.available_seats;
        course.selection_start_time = input.selection_start_time;
        course.selection_end_time = input.selection_end_time;
        course.is_active = input.is_active;
        // Strictly monotonic so a stale token never matches.
        course.updated_at = Utc::now().max(course.updated_at + chrono::Duration::microseconds(1));
        Ok(CourseUpdate::Updated(course.clone()))
    }

    async fn delete(&self, id: CourseId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.courses.remove(&id).is_none() {
            return Ok(false);
        }
        tables.enrollments.retain(|(_, course_id), _| *course_id != id);
        Ok(true)
    }
}

#[async_trait]
impl StudentStore for MemoryDatabase {
    async fn find_by_id(&self, id: StudentId) -> AppResult<Option<Student>> {
        Ok(self.tables.lock().await.students.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Student>> {
        Ok(self.tables.lock().await.students.values().cloned().collect())
    }

    async fn create(&self, input: &CreateStudent) -> AppResult<Student> {
        let mut tables = self.tables.lock().await;
        if tables
            .students
            .values()
            .any(|s| s.student_number == input.student_number)
        {
            return Err(AppError::conflict(format!(
                "Student number '{}' is already registered",
                input.student_number
            )));
        }
        tables.next_student_id += 1;
        let now = Utc::now();
        let student = Student {
            id: StudentId(tables.next_student_id),
            name: input.name.clone(),
            student_number: input.student_number.clone(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: StudentId, input: &UpdateStudent) -> AppResult<Option<Student>> {
        let mut tables = self.tables.lock().await;
        if tables
            .students
            .values()
            .any(|s| s.id != id && s.student_number == input.student_number)
        {
            return Err(AppError::conflict(format!(
                "Student number '{}' is already registered",
                input.student_number
            )));
        }
        let Some(student) = tables.students.get_mut(&id) else {
            return Ok(None);
        };
        student.name = input.name.clone();
        student.student_number = input.student_number.clone();
        student.email = input.email.clone();
        student.updated_at = Utc::now();
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: StudentId) -> AppResult<Option<Vec<CourseId>>> {
        let mut tables = self.tables.lock().await;
        if tables.students.remove(&id).is_none() {
            return Ok(None);
        }

        let held: Vec<CourseId> = tables
            .enrollments
            .keys()
            .filter(|(student_id, _)| *student_id == id)
            .map(|(_, course_id)| *course_id)
            .collect();

        let mut released = Vec::with_capacity(held.len());
        for course_id in held {
            tables.enrollments.remove(&(id, course_id));
            if let Some(course) = tables.courses.get_mut(&course_id) {
                if course.available_seats < course.total_seats {
                    course.available_seats += 1;
                    course.updated_at = Utc::now();
                    released.push(course_id);
                }
            }
        }
        Ok(Some(released))
    }

    async fn find_courses(&self, id: StudentId) -> AppResult<Vec<Course>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .enrollments
            .keys()
            .filter(|(student_id, _)| *student_id == id)
            .filter_map(|(_, course_id)| tables.courses.get(course_id).cloned())
            .collect())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryDatabase {
    async fn find(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        let tables = self.tables.lock().await;
        Ok(tables.enrollments.get(&(student_id, course_id)).cloned())
    }

    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        at: DateTime<Utc>,
    ) -> AppResult<EnrollWrite> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;

        if tables.enrollments.contains_key(&(student_id, course_id)) {
            return Ok(EnrollWrite::Duplicate);
        }
        if !tables.students.contains_key(&student_id) {
            return Ok(EnrollWrite::StudentMissing);
        }
        let Some(course) = tables.courses.get_mut(&course_id) else {
            return Ok(EnrollWrite::CourseMissing);
        };
        if course.available_seats <= 0 {
            return Ok(EnrollWrite::NoSeats);
        }
        course.available_seats -= 1;
        course.updated_at = Utc::now();

        let enrollment = Enrollment {
            student_id,
            course_id,
            enrollment_date: at,
        };
        tables
            .enrollments
            .insert((student_id, course_id), enrollment.clone());
        Ok(EnrollWrite::Recorded(enrollment))
    }

    async fn withdraw(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;

        if tables.enrollments.remove(&(student_id, course_id)).is_none() {
            return Ok(false);
        }
        if let Some(course) = tables.courses.get_mut(&course_id) {
            if course.available_seats < course.total_seats {
                course.available_seats += 1;
                course.updated_at = Utc::now();
            }
        }
        Ok(true)
    }

    async fn count_by_course(&self, course_id: CourseId) -> AppResult<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .enrollments
            .keys()
            .filter(|(_, id)| *id == course_id)
            .count() as i64)
    }
}
