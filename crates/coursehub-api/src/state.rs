//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use coursehub_cache::CacheManager;
use coursehub_core::config::AppConfig;
use coursehub_database::DatabasePool;
use coursehub_service::{CourseService, SelectionService, StockService, StudentService};

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Postgres pool; `None` when running on the in-memory store.
    pub database: Option<DatabasePool>,
    /// Shared cache hosting stock counters and course locks.
    pub cache: CacheManager,
    /// Course administration.
    pub course_service: CourseService,
    /// Student administration.
    pub student_service: StudentService,
    /// Stock counter maintenance.
    pub stock_service: StockService,
    /// Select / cancel orchestration.
    pub selection_service: SelectionService,
}
