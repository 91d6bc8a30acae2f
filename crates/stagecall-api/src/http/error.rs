//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use stagecall_types::error::EngineError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Pipeline failure (configuration or upstream provider).
    Engine(EngineError),
    /// Validation error.
    Validation(String),
    /// Missing resource.
    NotFound(String),
    /// Upstream fetch failure in the audio proxy.
    BadGateway(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Engine diagnostics go to the log; clients get a generic body.
        // Credentials never reach the error text in the first place.
        let (status, code, message) = match &self {
            AppError::Engine(e @ EngineError::Configuration(_)) => {
                tracing::error!(error = %e, "Pipeline configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "internal error".to_string(),
                )
            }
            AppError::Engine(e @ EngineError::Upstream { .. }) => {
                tracing::error!(error = %e, "Upstream provider error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "internal error".to_string(),
                )
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Audio proxy upstream failure");
                (StatusCode::BAD_GATEWAY, "BAD_UPSTREAM", msg.clone())
            }
        };

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
