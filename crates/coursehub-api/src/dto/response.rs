//! Response DTOs.

use serde::{Deserialize, Serialize};

use coursehub_core::types::CourseId;
use coursehub_service::{RejectionCategory, SelectionRejection, SelectionSuccess};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Outcome of a select or cancel call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResponse {
    /// Whether the operation went through.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Rejection code, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Rejection class, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RejectionCategory>,
    /// Whether the same request may succeed later, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    /// Stock counter right after a successful operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_stock: Option<i64>,
}

impl From<&SelectionSuccess> for SelectionResponse {
    fn from(success: &SelectionSuccess) -> Self {
        Self {
            success: true,
            message: success.message().to_string(),
            code: None,
            category: None,
            retryable: None,
            remaining_stock: Some(success.remaining_stock),
        }
    }
}

impl From<&SelectionRejection> for SelectionResponse {
    fn from(rejection: &SelectionRejection) -> Self {
        Self {
            success: false,
            message: rejection.to_string(),
            code: Some(rejection.code().to_string()),
            category: Some(rejection.category()),
            retryable: Some(rejection.is_retryable()),
            remaining_stock: None,
        }
    }
}

/// Stock counter value for a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockResponse {
    /// Course id.
    pub course_id: CourseId,
    /// Counter value; zero when uninitialized.
    pub stock: i64,
}

/// Result of a bulk stock initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeAllResponse {
    /// Number of courses whose counters were written.
    pub initialized: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `up`, `down`, or `memory` when no database is configured.
    pub database: String,
    /// `up` or `down`.
    pub cache: String,
}
