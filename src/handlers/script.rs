use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::{
    dto::script::ScriptResponse,
    handlers::{bad_request, gemini_error_response, MAX_PHOTO_BYTES},
    services::gemini::{ImageAttachment, ScriptRequest},
    utils::detect_image_mime,
    AppState,
};

const DEFAULT_DURATION_SECS: u32 = 60;
const DEFAULT_COUNT: u32 = 1;

#[utoipa::path(
    post,
    path = "/api/scripts",
    responses(
        (status = 200, description = "Scripts generated", body = ScriptResponse),
        (status = 400, description = "Invalid form input"),
        (status = 422, description = "Content blocked by the model"),
        (status = 502, description = "Upstream API failure")
    ),
    tag = "studio"
)]
pub async fn generate_scripts(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut main_photo: Option<(Vec<u8>, Option<String>)> = None;
    let mut detail_photo: Option<(Vec<u8>, Option<String>)> = None;
    let mut product_details = String::new();
    let mut target_audience = String::new();
    let mut other_details = String::new();
    let mut duration_field = String::new();
    let mut count_field = String::new();

    // Parse multipart data
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        match field.name().unwrap_or("") {
            "main_photo" | "detail_photo" => {
                let name = field.name().unwrap_or("").to_string();
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
                    let slot = if name == "main_photo" {
                        &mut main_photo
                    } else {
                        &mut detail_photo
                    };
                    *slot = Some((data.to_vec(), content_type));
                }
            }
            "product_details" => product_details = field.text().await.unwrap_or_default(),
            "target_audience" => target_audience = field.text().await.unwrap_or_default(),
            "other_details" => other_details = field.text().await.unwrap_or_default(),
            "duration" => duration_field = field.text().await.unwrap_or_default(),
            "count" => count_field = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    // Validate required fields
    let main_photo = match main_photo {
        Some((data, _)) if data.is_empty() => {
            return bad_request("Please upload a main product photo.")
        }
        Some(photo) => photo,
        None => return bad_request("Please upload a main product photo."),
    };

    if product_details.trim().is_empty() && detail_photo.is_none() {
        return bad_request(
            "Please provide product details in text or upload a detail photo.",
        );
    }

    let duration_secs = match parse_bounded(&duration_field, DEFAULT_DURATION_SECS, 10, 180) {
        Some(value) => value,
        None => return bad_request("Duration must be between 10 and 180 seconds."),
    };
    let count = match parse_bounded(&count_field, DEFAULT_COUNT, 1, 5) {
        Some(value) => value,
        None => return bad_request("Number of scripts must be between 1 and 5."),
    };

    let main_image = match to_attachment(main_photo) {
        Some(image) => image,
        None => return bad_request("The main photo is not a recognized image format."),
    };
    let detail_image = match detail_photo {
        Some(photo) => match to_attachment(photo) {
            Some(image) => Some(image),
            None => return bad_request("The detail photo is not a recognized image format."),
        },
        None => None,
    };

    let request = ScriptRequest {
        product_details,
        target_audience,
        other_details,
        duration_secs,
        count,
        main_image,
        detail_image,
    };

    info!(
        "Script generation requested: {} variant(s), ~{}s each",
        count, duration_secs
    );

    match state.gemini.generate_scripts(&request).await {
        Ok(scripts) => (
            StatusCode::OK,
            Json(ScriptResponse::new(scripts, state.gemini.text_model())),
        )
            .into_response(),
        Err(e) => gemini_error_response("Script generation", e),
    }
}

fn parse_bounded(raw: &str, default: u32, min: u32, max: u32) -> Option<u32> {
    if raw.trim().is_empty() {
        return Some(default);
    }
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (min..=max).contains(value))
}

fn to_attachment((data, declared): (Vec<u8>, Option<String>)) -> Option<ImageAttachment> {
    let mime_type = detect_image_mime(&data, declared.as_deref())?;
    Some(ImageAttachment { mime_type, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounded_defaults_on_blank() {
        assert_eq!(parse_bounded("", 60, 10, 180), Some(60));
        assert_eq!(parse_bounded("  ", 1, 1, 5), Some(1));
    }

    #[test]
    fn test_parse_bounded_accepts_in_range() {
        assert_eq!(parse_bounded("45", 60, 10, 180), Some(45));
        assert_eq!(parse_bounded("5", 1, 1, 5), Some(5));
    }

    #[test]
    fn test_parse_bounded_rejects_out_of_range_and_garbage() {
        assert_eq!(parse_bounded("5", 60, 10, 180), None);
        assert_eq!(parse_bounded("181", 60, 10, 180), None);
        assert_eq!(parse_bounded("0", 1, 1, 5), None);
        assert_eq!(parse_bounded("six", 1, 1, 5), None);
        assert_eq!(parse_bounded("-1", 1, 1, 5), None);
    }

    #[test]
    fn test_to_attachment_detects_mime() {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let attachment = to_attachment((png, None)).unwrap();
        assert_eq!(attachment.mime_type, "image/png");
    }

    #[test]
    fn test_to_attachment_rejects_non_image() {
        assert!(to_attachment((b"hello".to_vec(), Some("text/plain".into()))).is_none());
    }
}
