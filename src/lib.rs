pub mod config;
pub mod dto;
pub mod handlers;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::AppConfig;
pub use services::gemini::GeminiService;

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiService>,
    pub config: Arc<AppConfig>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::script::generate_scripts,
        handlers::render::render_image,
        handlers::health::health,
    ),
    components(schemas(
        dto::script::ScriptResponse,
        dto::script::ScriptVariant,
        dto::render::RenderResponse,
        dto::health::HealthResponse,
    )),
    tags(
        (name = "studio", description = "Affiliate script and image generation API")
    )
)]
pub struct ApiDoc;

/// Request bodies may carry two photos at the per-photo cap plus form
/// fields and multipart framing; the handlers enforce the per-photo cap.
const MAX_BODY_BYTES: usize = 2 * handlers::MAX_PHOTO_BYTES + 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/scripts", post(handlers::script::generate_scripts))
        .route("/api/render", post(handlers::render::render_image))
        .route("/api/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let page_routes = Router::new().route("/", get(handlers::pages::studio_page));

    let api_docs_routes =
        Router::new().merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .merge(api_docs_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
