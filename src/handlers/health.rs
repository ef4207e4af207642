use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::error;

use crate::{dto::health::HealthResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Gemini API reachable", body = HealthResponse),
        (status = 503, description = "Gemini API unreachable or misconfigured")
    ),
    tag = "studio"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.gemini.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                text_model: state.gemini.text_model().to_string(),
                image_model: state.gemini.image_model().to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": format!("Health check failed: {}", e)})),
            )
                .into_response()
        }
    }
}
