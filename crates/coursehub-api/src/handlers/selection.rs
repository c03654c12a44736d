//! Course selection handlers.
//!
//! Business rejections are 400 with a message and a code; only internal
//! failures are 500.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use coursehub_service::{RejectionCategory, SelectionRejection, SelectionSuccess};

use crate::dto::request::SelectionRequest;
use crate::dto::response::SelectionResponse;
use crate::state::AppState;

fn respond(
    outcome: Result<SelectionSuccess, SelectionRejection>,
) -> (StatusCode, Json<SelectionResponse>) {
    match &outcome {
        Ok(success) => (StatusCode::OK, Json(success.into())),
        Err(rejection) => {
            let status = match rejection.category() {
                RejectionCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            (status, Json(rejection.into()))
        }
    }
}

/// POST /api/selection/select
pub async fn select(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> (StatusCode, Json<SelectionResponse>) {
    respond(
        state
            .selection_service
            .select(req.student_id, req.course_id)
            .await,
    )
}

/// POST /api/selection/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> (StatusCode, Json<SelectionResponse>) {
    respond(
        state
            .selection_service
            .cancel(req.student_id, req.course_id)
            .await,
    )
}
