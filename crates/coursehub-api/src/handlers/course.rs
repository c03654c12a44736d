//! Course administration and stock maintenance handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use coursehub_core::types::CourseId;
use coursehub_entity::course::Course;

use crate::dto::request::{CreateCourseRequest, SetStockRequest, UpdateCourseRequest};
use crate::dto::response::{ApiResponse, InitializeAllResponse, StockResponse};
use crate::error::ApiError;
use crate::handlers::validate;
use crate::state::AppState;

/// GET /api/courses
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Course>>>, ApiError> {
    let courses = state.course_service.list().await?;
    Ok(Json(ApiResponse::ok(courses)))
}

/// GET /api/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    let course = state.course_service.get(id).await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// POST /api/courses
pub async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    validate(&req)?;
    let course = state.course_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(course))))
}

/// PUT /api/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    validate(&req)?;
    let (input, expected_updated_at) = req.into_parts();
    let course = state
        .course_service
        .update(id, input, expected_updated_at)
        .await?;
    Ok(Json(ApiResponse::ok(course)))
}

/// DELETE /api/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> Result<StatusCode, ApiError> {
    state.course_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/courses/{id}/stock
pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> Result<Json<ApiResponse<StockResponse>>, ApiError> {
    let stock = state.stock_service.get_stock(id).await?;
    Ok(Json(ApiResponse::ok(StockResponse {
        course_id: id,
        stock,
    })))
}

/// PUT /api/courses/{id}/stock
pub async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<ApiResponse<StockResponse>>, ApiError> {
    validate(&req)?;
    state.course_service.get(id).await?;
    state.stock_service.set_stock(id, req.value).await?;
    Ok(Json(ApiResponse::ok(StockResponse {
        course_id: id,
        stock: req.value,
    })))
}

/// POST /api/courses/{id}/stock/initialize
pub async fn initialize_stock(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> Result<Json<ApiResponse<StockResponse>>, ApiError> {
    let stock = state.stock_service.initialize_stock(id).await?;
    Ok(Json(ApiResponse::ok(StockResponse {
        course_id: id,
        stock,
    })))
}

/// POST /api/courses/initialize-stocks
pub async fn initialize_all_stocks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InitializeAllResponse>>, ApiError> {
    let initialized = state.stock_service.initialize_all().await?;
    Ok(Json(ApiResponse::ok(InitializeAllResponse { initialized })))
}
