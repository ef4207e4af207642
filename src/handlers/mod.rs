pub mod health;
pub mod pages;
pub mod render;
pub mod script;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::services::gemini::GeminiError;

/// Largest accepted photo upload.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

/// Maps adapter errors onto the single user-visible message per operation.
pub(crate) fn gemini_error_response(operation: &str, err: GeminiError) -> Response {
    error!("{} failed: {}", operation, err);
    let status = match &err {
        GeminiError::ContentBlocked(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GeminiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        GeminiError::Auth(_) | GeminiError::ModelNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GeminiError::Api { .. } | GeminiError::Network(_) | GeminiError::EmptyResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (
        status,
        Json(serde_json::json!({"error": format!("{} failed: {}", operation, err)})),
    )
        .into_response()
}
