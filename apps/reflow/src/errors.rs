use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Per-block reflow failure. Always contained to the block it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflowError {
    #[error("Element '{id}' has no source text")]
    MissingSourceText { id: String },

    #[error("Text measurement is unavailable in this environment")]
    MeasurementUnavailable,

    #[error("Element '{id}' no longer exists")]
    StaleElement { id: String },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Reflow error: {0}")]
    Reflow(#[from] ReflowError),

    #[error("Reflow driver is not running")]
    Unavailable,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Reflow(e @ ReflowError::StaleElement { .. }) => {
                (StatusCode::NOT_FOUND, "STALE_ELEMENT", e.to_string())
            }
            AppError::Reflow(e @ ReflowError::MissingSourceText { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MISSING_SOURCE_TEXT",
                e.to_string(),
            ),
            AppError::Reflow(e @ ReflowError::MeasurementUnavailable) => {
                tracing::warn!("Reflow error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MEASUREMENT_UNAVAILABLE",
                    e.to_string(),
                )
            }
            AppError::Unavailable => {
                tracing::error!("Reflow driver has stopped");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UNAVAILABLE",
                    "The reflow driver is not running".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
