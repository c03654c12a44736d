//! Student administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use coursehub_core::types::StudentId;
use coursehub_entity::course::Course;
use coursehub_entity::student::Student;

use crate::dto::request::StudentRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::handlers::validate;
use crate::state::AppState;

/// GET /api/students
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Student>>>, ApiError> {
    let students = state.student_service.list().await?;
    Ok(Json(ApiResponse::ok(students)))
}

/// GET /api/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<ApiResponse<Student>>, ApiError> {
    let student = state.student_service.get(id).await?;
    Ok(Json(ApiResponse::ok(student)))
}

/// GET /api/students/{id}/courses
pub async fn student_courses(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<ApiResponse<Vec<Course>>>, ApiError> {
    let courses = state.student_service.courses(id).await?;
    Ok(Json(ApiResponse::ok(courses)))
}

/// POST /api/students
pub async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<StudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Student>>), ApiError> {
    validate(&req)?;
    let student = state.student_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(student))))
}

/// PUT /api/students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Json(req): Json<StudentRequest>,
) -> Result<Json<ApiResponse<Student>>, ApiError> {
    validate(&req)?;
    let student = state.student_service.update(id, req.into()).await?;
    Ok(Json(ApiResponse::ok(student)))
}

/// DELETE /api/students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<StatusCode, ApiError> {
    state.student_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
