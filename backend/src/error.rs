//! Error types for the live analysis API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced by `POST /analyze`.
///
/// Validation errors carry their message to the client; internal errors are
/// logged with full context and surfaced as a fixed generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,

    #[error("Empty image")]
    EmptyImage,

    #[error("Invalid image format")]
    UndecodableImage,

    #[error("Internal processing error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingImage | ApiError::EmptyImage | ApiError::UndecodableImage => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "analyze request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
