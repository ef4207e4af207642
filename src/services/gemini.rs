use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::services::prompt;

/// Literal delimiter the model is instructed to place between script
/// variants. Splitting the response on this string yields the variants.
pub const SCRIPT_SEPARATOR: &str = "---SCRIPT-SEPARATOR---";

/// Errors surfaced by the Gemini adapter. Each maps to a single
/// user-visible message; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("authentication with the Gemini API failed: {0}")]
    Auth(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("rate limited by the Gemini API")]
    RateLimited,

    #[error("Gemini API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("content blocked: {0}")]
    ContentBlocked(String),

    #[error("empty response: {0}")]
    EmptyResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// An uploaded photo ready to attach to a request.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Inputs for one script-generation call.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub product_details: String,
    pub target_audience: String,
    pub other_details: String,
    pub duration_secs: u32,
    pub count: u32,
    pub main_image: ImageAttachment,
    pub detail_image: Option<ImageAttachment>,
}

/// Inputs for one image-render call.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub prompt: String,
    pub image: ImageAttachment,
}

/// A rendered image as returned by the model: raw base64 plus mime type.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub mime_type: String,
    pub data_base64: String,
}

/// Adapter for the Gemini `generateContent` REST endpoint.
///
/// Single-shot calls only: no retry, no backoff, no partial results.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    base_url: String,
    text_model: String,
    image_model: String,
    api_key: String,
}

impl GeminiService {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key is not configured"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            api_key,
        })
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    /// Generates script variants from a product photo and description.
    ///
    /// The response text is split on [`SCRIPT_SEPARATOR`]; trimmed,
    /// non-empty segments are the variants, in response order.
    pub async fn generate_scripts(
        &self,
        request: &ScriptRequest,
    ) -> Result<Vec<String>, GeminiError> {
        let body = GenerateContentRequest::for_scripts(request);
        let response = self.generate_content(&self.text_model, &body).await?;
        let candidate = first_usable_candidate(response)?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let scripts = split_scripts(&text);
        if scripts.is_empty() {
            return Err(GeminiError::EmptyResponse(
                "no script was generated in the API response".to_string(),
            ));
        }
        tracing::info!(
            "Generated {} script(s) (requested {})",
            scripts.len(),
            request.count
        );
        Ok(scripts)
    }

    /// Renders a new product image from a photo and a free-text prompt.
    ///
    /// The first inline-data part of the first candidate is the result.
    pub async fn render_image(
        &self,
        request: &RenderRequest,
    ) -> Result<RenderedImage, GeminiError> {
        let body = GenerateContentRequest::for_render(request);
        let response = self.generate_content(&self.image_model, &body).await?;
        let candidate = first_usable_candidate(response)?;

        let content = candidate.content.ok_or_else(|| {
            GeminiError::EmptyResponse("no content in the API response".to_string())
        })?;

        let inline = content
            .parts
            .into_iter()
            .find_map(|part| part.inline_data)
            .ok_or_else(|| {
                GeminiError::EmptyResponse("no image data found in the API response".to_string())
            })?;

        Ok(RenderedImage {
            mime_type: inline.mime_type,
            data_base64: inline.data,
        })
    }

    /// Probes the configured text model resource.
    pub async fn health_check(&self) -> Result<(), GeminiError> {
        let url = format!("{}/models/{}", self.base_url, self.text_model);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(GeminiError::Auth("invalid API key".to_string())),
            404 => Err(GeminiError::ModelNotFound(self.text_model.clone())),
            status if !(200..300).contains(&status) => Err(GeminiError::Api {
                status,
                message: "health check failed".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status.as_u16(), text));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

fn map_http_error(status: u16, body: String) -> GeminiError {
    match status {
        401 | 403 => GeminiError::Auth(body),
        404 => GeminiError::ModelNotFound(body),
        429 => GeminiError::RateLimited,
        _ => GeminiError::Api {
            status,
            message: body,
        },
    }
}

/// Applies prompt-feedback and finish-reason checks, returning the first
/// candidate when the response is usable. Safety blocks arrive as HTTP 200.
fn first_usable_candidate(
    response: GenerateContentResponse,
) -> Result<Candidate, GeminiError> {
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let message = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("prompt blocked: {}", reason));
            return Err(GeminiError::ContentBlocked(message));
        }
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        GeminiError::EmptyResponse("no candidates in the API response".to_string())
    })?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        match reason {
            "SAFETY" | "IMAGE_SAFETY" | "IMAGE_PROHIBITED_CONTENT" | "IMAGE_RECITATION"
            | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" => {
                return Err(GeminiError::ContentBlocked(format!(
                    "blocked by the Gemini safety filter: {}",
                    reason
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    Ok(candidate)
}

/// Splits a model response on the literal script separator, trimming each
/// segment and dropping empty ones.
pub fn split_scripts(text: &str) -> Vec<String> {
    text.split(SCRIPT_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

// Wire types for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

/// A part in a request - either prompt text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

impl RequestPart {
    fn from_attachment(image: &ImageAttachment) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&image.data),
            },
        }
    }
}

impl GenerateContentRequest {
    /// Parts order follows the instruction template: user prompt first,
    /// then the main photo, then the optional detail photo.
    fn for_scripts(request: &ScriptRequest) -> Self {
        let mut parts = vec![RequestPart::Text {
            text: prompt::build_user_prompt(request),
        }];
        parts.push(RequestPart::from_attachment(&request.main_image));
        if let Some(ref detail) = request.detail_image {
            parts.push(RequestPart::from_attachment(detail));
        }

        Self {
            contents: vec![RequestContent { parts }],
            system_instruction: Some(RequestContent {
                parts: vec![RequestPart::Text {
                    text: prompt::build_system_instruction(request.count, request.duration_secs),
                }],
            }),
            generation_config: None,
        }
    }

    fn for_render(request: &RenderRequest) -> Self {
        let parts = vec![
            RequestPart::Text {
                text: request.prompt.clone(),
            },
            RequestPart::from_attachment(&request.image),
        ];

        Self {
            contents: vec![RequestContent { parts }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_attachment() -> ImageAttachment {
        ImageAttachment {
            mime_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        }
    }

    fn script_request() -> ScriptRequest {
        ScriptRequest {
            product_details: "Collapsible water bottle".to_string(),
            target_audience: "Hikers".to_string(),
            other_details: String::new(),
            duration_secs: 60,
            count: 2,
            main_image: png_attachment(),
            detail_image: None,
        }
    }

    #[test]
    fn test_split_scripts_on_separator() {
        let text = format!(
            "First script here.\n{}\nSecond script here.",
            SCRIPT_SEPARATOR
        );
        let scripts = split_scripts(&text);
        assert_eq!(scripts, vec!["First script here.", "Second script here."]);
    }

    #[test]
    fn test_split_scripts_drops_empty_segments() {
        let text = format!(
            "{}\nOnly one real script.\n{}\n   \n",
            SCRIPT_SEPARATOR, SCRIPT_SEPARATOR
        );
        let scripts = split_scripts(&text);
        assert_eq!(scripts, vec!["Only one real script."]);
    }

    #[test]
    fn test_split_scripts_without_separator_is_single_segment() {
        let scripts = split_scripts("Just a single script, no delimiter.");
        assert_eq!(scripts.len(), 1);
    }

    #[test]
    fn test_split_scripts_empty_text() {
        assert!(split_scripts("").is_empty());
        assert!(split_scripts("   \n  ").is_empty());
    }

    #[test]
    fn test_script_request_parts_order() {
        let mut request = script_request();
        request.detail_image = Some(png_attachment());
        let body = GenerateContentRequest::for_scripts(&request);

        // Prompt text first, then main photo, then detail photo
        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].parts.len(), 3);
        assert!(matches!(body.contents[0].parts[0], RequestPart::Text { .. }));
        assert!(matches!(
            body.contents[0].parts[1],
            RequestPart::InlineData { .. }
        ));
        assert!(body.system_instruction.is_some());
        assert!(body.generation_config.is_none());
    }

    #[test]
    fn test_render_request_asks_for_image_modality() {
        let request = RenderRequest {
            prompt: "Put this bottle on a beach".to_string(),
            image: png_attachment(),
        };
        let body = GenerateContentRequest::for_render(&request);

        assert_eq!(body.contents[0].parts.len(), 2);
        assert!(body.system_instruction.is_none());
        assert_eq!(
            body.generation_config.as_ref().unwrap().response_modalities,
            vec!["IMAGE"]
        );
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let body = GenerateContentRequest::for_scripts(&script_request());
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("systemInstruction").is_some());
        assert!(json.get("system_instruction").is_none());
        let part = &json["contents"][0]["parts"][1];
        assert!(part["inlineData"]["mimeType"].is_string());
        assert!(part.get("inline_data").is_none());
    }

    #[test]
    fn test_response_deserialization_text() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "A script"}]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let candidate = first_usable_candidate(response).unwrap();
        let content = candidate.content.unwrap();
        assert_eq!(content.parts[0].text.as_deref(), Some("A script"));
    }

    #[test]
    fn test_response_deserialization_inline_image() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": "iVBORw0KGgo="
                        }
                    }]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let candidate = first_usable_candidate(response).unwrap();
        let mut content = candidate.content.unwrap();
        let inline = content.parts[0].inline_data.take().unwrap();
        assert_eq!(inline.mime_type, "image/png");
    }

    #[test]
    fn test_prompt_feedback_block_is_content_blocked() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked"
            }
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = first_usable_candidate(response).unwrap_err();
        assert!(matches!(err, GeminiError::ContentBlocked(_)));
    }

    #[test]
    fn test_safety_finish_reason_is_content_blocked() {
        let json = r#"{
            "candidates": [{"finishReason": "IMAGE_SAFETY"}]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = first_usable_candidate(response).unwrap_err();
        assert!(matches!(err, GeminiError::ContentBlocked(_)));
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = first_usable_candidate(response).unwrap_err();
        assert!(matches!(err, GeminiError::EmptyResponse(_)));
    }

    #[test]
    fn test_http_error_mapping() {
        assert!(matches!(
            map_http_error(401, String::new()),
            GeminiError::Auth(_)
        ));
        assert!(matches!(
            map_http_error(404, String::new()),
            GeminiError::ModelNotFound(_)
        ));
        assert!(matches!(
            map_http_error(429, String::new()),
            GeminiError::RateLimited
        ));
        assert!(matches!(
            map_http_error(500, String::new()),
            GeminiError::Api { status: 500, .. }
        ));
    }
}
