//! Application builder: wires services into state and state into a router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use coursehub_cache::{CacheManager, CourseLock, StockCounter};
use coursehub_core::config::AppConfig;
use coursehub_database::DatabasePool;
use coursehub_database::store::{CourseStore, EnrollmentStore, StudentStore};
use coursehub_service::{CourseService, SelectionService, StockService, StudentService};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Store handles the services are built on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Course persistence.
    pub courses: Arc<dyn CourseStore>,
    /// Student persistence.
    pub students: Arc<dyn StudentStore>,
    /// Enrollment persistence.
    pub enrollments: Arc<dyn EnrollmentStore>,
}

impl AppState {
    /// Builds every service from the stores and the shared cache.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        cache: CacheManager,
        database: Option<DatabasePool>,
    ) -> Self {
        let stock_counter = StockCounter::new(cache.clone());
        let locks = CourseLock::new(
            cache.clone(),
            Duration::from_secs(config.selection.lock_ttl_seconds),
        );
        let stock_service = StockService::new(stores.courses.clone(), stock_counter.clone());

        Self {
            course_service: CourseService::new(stores.courses.clone(), stock_service.clone()),
            student_service: StudentService::new(stores.students, stock_service.clone()),
            selection_service: SelectionService::new(
                stores.courses,
                stores.enrollments,
                stock_counter,
                locks,
            ),
            stock_service,
            config: Arc::new(config),
            database,
            cache,
        }
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let timeout = Duration::from_secs(server.request_timeout_seconds);
    let cors = build_cors_layer(&server.cors);

    Router::new()
        .nest("/api", build_router())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}
