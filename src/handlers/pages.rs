use axum::response::Html;

/// Serves the single-page studio UI.
pub async fn studio_page() -> Html<&'static str> {
    Html(include_str!("../templates/studio.html"))
}
