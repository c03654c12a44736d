//! Shared fixtures: every service wired over the in-memory store and the
//! moka cache provider, plus a few misbehaving stand-ins for either side.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coursehub_cache::memory::MemoryCacheProvider;
use coursehub_cache::{CacheManager, CourseLock, StockCounter};
use coursehub_core::config::MemoryCacheConfig;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::CacheProvider;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_database::MemoryDatabase;
use coursehub_database::store::{CourseStore, EnrollWrite, EnrollmentStore, StudentStore};
use coursehub_entity::course::{Course, CreateCourse};
use coursehub_entity::enrollment::Enrollment;
use coursehub_entity::student::{CreateStudent, Student};
use coursehub_service::{CourseService, SelectionService, StockService, StudentService};

pub struct Harness {
    pub db: Arc<MemoryDatabase>,
    pub cache: CacheManager,
    pub locks: CourseLock,
    pub stock_counter: StockCounter,
    pub stock: StockService,
    pub courses: CourseService,
    pub students: StudentService,
    pub selection: SelectionService,
}

pub fn harness() -> Harness {
    harness_with_ttl(Duration::from_secs(10))
}

pub fn harness_with_ttl(lock_ttl: Duration) -> Harness {
    let db = Arc::new(MemoryDatabase::new());
    harness_with(db.clone(), db, memory_provider(), lock_ttl)
}

pub fn memory_provider() -> Arc<MemoryCacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()))
}

/// Wire the services with a custom enrollment store and cache provider.
/// Courses and students still live in `db`.
pub fn harness_with(
    db: Arc<MemoryDatabase>,
    enrollment_store: Arc<dyn EnrollmentStore>,
    provider: Arc<dyn CacheProvider>,
    lock_ttl: Duration,
) -> Harness {
    let cache = CacheManager::from_provider(provider);
    let course_store: Arc<dyn CourseStore> = db.clone();
    let student_store: Arc<dyn StudentStore> = db.clone();

    let locks = CourseLock::new(cache.clone(), lock_ttl);
    let stock_counter = StockCounter::new(cache.clone());
    let stock = StockService::new(course_store.clone(), stock_counter.clone());

    Harness {
        courses: CourseService::new(course_store.clone(), stock.clone()),
        students: StudentService::new(student_store, stock.clone()),
        selection: SelectionService::new(
            course_store,
            enrollment_store,
            stock_counter.clone(),
            locks.clone(),
        ),
        db,
        cache,
        locks,
        stock_counter,
        stock,
    }
}

pub fn course_input(
    seats: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateCourse {
    CreateCourse {
        name: "Concurrent Programming".to_string(),
        description: "Locks, atomics, and the occasional race".to_string(),
        total_seats: seats,
        available_seats: None,
        selection_start_time: start,
        selection_end_time: end,
        is_active: true,
    }
}

impl Harness {
    /// A course whose selection window is currently open; stock is seeded.
    pub async fn open_course(&self, seats: i32) -> Course {
        let now = Utc::now();
        self.courses
            .create(course_input(
                seats,
                now - chrono::Duration::hours(1),
                now + chrono::Duration::hours(1),
            ))
            .await
            .unwrap()
    }

    pub async fn student(&self, n: usize) -> Student {
        self.students
            .create(CreateStudent {
                name: format!("Student {n}"),
                student_number: format!("S{n:05}"),
                email: format!("s{n}@example.edu"),
            })
            .await
            .unwrap()
    }

    pub async fn stored_course(&self, course: &Course) -> Course {
        self.courses.get(course.id).await.unwrap()
    }
}

/// Enrollment store whose writes take `delay` before reaching `inner`.
#[derive(Debug)]
pub struct SlowEnrollments {
    pub inner: Arc<MemoryDatabase>,
    pub delay: Duration,
}

#[async_trait]
impl EnrollmentStore for SlowEnrollments {
    async fn find(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        self.inner.find(student_id, course_id).await
    }

    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        at: DateTime<Utc>,
    ) -> AppResult<EnrollWrite> {
        tokio::time::sleep(self.delay).await;
        self.inner.enroll(student_id, course_id, at).await
    }

    async fn withdraw(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        self.inner.withdraw(student_id, course_id).await
    }

    async fn count_by_course(&self, course_id: CourseId) -> AppResult<i64> {
        self.inner.count_by_course(course_id).await
    }
}

/// Enrollment store whose lookups always find a row, so a cancel reaches
/// the locked section even when nothing is enrolled.
#[derive(Debug)]
pub struct GhostEnrollments {
    pub inner: Arc<MemoryDatabase>,
}

#[async_trait]
impl EnrollmentStore for GhostEnrollments {
    async fn find(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        Ok(Some(Enrollment {
            student_id,
            course_id,
            enrollment_date: Utc::now(),
        }))
    }

    async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        at: DateTime<Utc>,
    ) -> AppResult<EnrollWrite> {
        self.inner.enroll(student_id, course_id, at).await
    }

    async fn withdraw(&self, student_id: StudentId, course_id: CourseId) -> AppResult<bool> {
        self.inner.withdraw(student_id, course_id).await
    }

    async fn count_by_course(&self, course_id: CourseId) -> AppResult<i64> {
        self.inner.count_by_course(course_id).await
    }
}

/// Memory cache that can serve stale stock reads or refuse increments.
#[derive(Debug)]
pub struct FlakyCache {
    inner: MemoryCacheProvider,
    stale_stock: AtomicBool,
    fail_incr: AtomicBool,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheProvider::new(&MemoryCacheConfig::default()),
            stale_stock: AtomicBool::new(false),
            fail_incr: AtomicBool::new(false),
        }
    }

    /// Every stock counter read returns `1` regardless of the stored value.
    pub fn serve_stale_stock(&self, on: bool) {
        self.stale_stock.store(on, Ordering::SeqCst);
    }

    pub fn fail_increments(&self, on: bool) {
        self.fail_incr.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheProvider for FlakyCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if key.ends_with(":stock") && self.stale_stock.load(Ordering::SeqCst) {
            return Ok(Some("1".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set_persistent(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        self.inner.compare_and_delete(key, expected).await
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        if self.fail_incr.load(Ordering::SeqCst) {
            return Err(AppError::cache(format!("INCR {key} refused")));
        }
        self.inner.incr(key).await
    }

    async fn decr(&self, key: &str) -> AppResult<i64> {
        self.inner.decr(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
