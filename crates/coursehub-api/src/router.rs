//! Route definitions for the CourseHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API routes. State is attached by [`crate::app::build_app`].
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(course_routes())
        .merge(student_routes())
        .merge(selection_routes())
}

/// Liveness and dependency reachability.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Course CRUD and stock maintenance.
fn course_routes() -> Router<AppState> {
    use handlers::course::*;

    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/initialize-stocks", post(initialize_all_stocks))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/stock", get(get_stock).put(set_stock))
        .route("/courses/{id}/stock/initialize", post(initialize_stock))
}

/// Student CRUD.
fn student_routes() -> Router<AppState> {
    use handlers::student::*;

    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/students/{id}/courses", get(student_courses))
}

/// Select / cancel.
fn selection_routes() -> Router<AppState> {
    Router::new()
        .route("/selection/select", post(handlers::selection::select))
        .route("/selection/cancel", post(handlers::selection::cancel))
}
