//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use coursehub_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

fn up_down(ok: bool) -> String {
    if ok { "up" } else { "down" }.to_string()
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let cache_ok = state.cache.health_check().await.unwrap_or(false);
    let (database, database_ok) = match &state.database {
        Some(pool) => {
            let ok = pool.health_check().await.unwrap_or(false);
            (up_down(ok), ok)
        }
        None => ("memory".to_string(), true),
    };

    let healthy = cache_ok && database_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            success: healthy,
            data: HealthResponse {
                status: if healthy { "ok" } else { "degraded" }.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                database,
                cache: up_down(cache_ok),
            },
        }),
    )
}
