//! Stock counter seeding and administrative overrides.

use std::sync::Arc;

use tracing::info;

use coursehub_cache::StockCounter;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::CourseId;
use coursehub_database::store::CourseStore;

/// Keeps the stock counters in line with the durable seat counts.
#[derive(Debug, Clone)]
pub struct StockService {
    /// Course lookups.
    courses: Arc<dyn CourseStore>,
    /// Stock counters.
    stock: StockCounter,
}

impl StockService {
    /// Creates a new stock service.
    pub fn new(courses: Arc<dyn CourseStore>, stock: StockCounter) -> Self {
        Self { courses, stock }
    }

    /// Seed a course's counter from its `available_seats`. Returns the value written.
    pub async fn initialize_stock(&self, course_id: CourseId) -> AppResult<i64> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {course_id} not found")))?;

        let seats = i64::from(course.available_seats);
        self.stock.initialize(course_id, seats).await?;
        info!(course_id = %course_id, seats, "Stock initialized");
        Ok(seats)
    }

    /// Seed every course's counter. Returns the number of courses seeded.
    pub async fn initialize_all(&self) -> AppResult<usize> {
        let courses = self.courses.find_all().await?;
        for course in &courses {
            self.stock
                .initialize(course.id, i64::from(course.available_seats))
                .await?;
        }
        info!(count = courses.len(), "Stock initialized for all courses");
        Ok(courses.len())
    }

    /// Overwrite a course's counter.
    pub async fn set_stock(&self, course_id: CourseId, value: i64) -> AppResult<()> {
        if value < 0 {
            return Err(AppError::validation("Stock must not be negative"));
        }
        self.stock.initialize(course_id, value).await?;
        info!(course_id = %course_id, value, "Stock overwritten");
        Ok(())
    }

    /// Delete a course's counter.
    pub async fn remove_stock(&self, course_id: CourseId) -> AppResult<()> {
        self.stock.remove(course_id).await?;
        info!(course_id = %course_id, "Stock removed");
        Ok(())
    }

    /// Current counter value; an absent counter reads as zero.
    pub async fn get_stock(&self, course_id: CourseId) -> AppResult<i64> {
        self.stock.get(course_id).await
    }

    /// Add one to a course's counter.
    pub(crate) async fn release_seat(&self, course_id: CourseId) -> AppResult<i64> {
        self.stock.increment(course_id).await
    }
}
