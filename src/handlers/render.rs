use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::{
    dto::render::RenderResponse,
    handlers::{bad_request, gemini_error_response, MAX_PHOTO_BYTES},
    services::gemini::{ImageAttachment, RenderRequest},
    utils::detect_image_mime,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/render",
    responses(
        (status = 200, description = "Image rendered", body = RenderResponse),
        (status = 400, description = "Invalid form input"),
        (status = 422, description = "Content blocked by the model"),
        (status = 502, description = "Upstream API failure")
    ),
    tag = "studio"
)]
pub async fn render_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut photo: Option<(Vec<u8>, Option<String>)> = None;
    let mut prompt = String::new();

    // Parse multipart data
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        match field.name().unwrap_or("") {
            "photo" => {
                let content_type = field.content_type().map(|ct| ct.to_string());
                if let Ok(data) = field.bytes().await {
                    if data.len() > MAX_PHOTO_BYTES {
                        return (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            Json(serde_json::json!({
                                "error": format!(
                                    "Photo too large: {:.2}MB",
                                    data.len() as f64 / (1024.0 * 1024.0)
                                )
                            })),
                        )
                            .into_response();
                    }
                    photo = Some((data.to_vec(), content_type));
                }
            }
            "prompt" => prompt = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    // Validate required fields
    let photo = match photo {
        Some((data, _)) if data.is_empty() => {
            return bad_request("Please ensure a photo is uploaded and provide a rendering prompt.")
        }
        Some(photo) => photo,
        None => {
            return bad_request("Please ensure a photo is uploaded and provide a rendering prompt.")
        }
    };
    if prompt.trim().is_empty() {
        return bad_request("Please ensure a photo is uploaded and provide a rendering prompt.");
    }

    let (data, declared) = photo;
    let image = match detect_image_mime(&data, declared.as_deref()) {
        Some(mime_type) => ImageAttachment { mime_type, data },
        None => return bad_request("The uploaded photo is not a recognized image format."),
    };

    let request = RenderRequest {
        prompt: prompt.trim().to_string(),
        image,
    };

    info!("Image render requested ({} byte photo)", request.image.data.len());

    match state.gemini.render_image(&request).await {
        Ok(rendered) => (
            StatusCode::OK,
            Json(RenderResponse::new(
                rendered.mime_type,
                &rendered.data_base64,
                state.gemini.image_model(),
            )),
        )
            .into_response(),
        Err(e) => gemini_error_response("Image rendering", e),
    }
}
