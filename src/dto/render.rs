use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenderResponse {
    /// Data URL ready to assign to an `<img src>`.
    pub image: String,
    pub mime_type: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

impl RenderResponse {
    pub fn new(mime_type: String, data_base64: &str, model: &str) -> Self {
        Self {
            image: format!("data:{};base64,{}", mime_type, data_base64),
            mime_type,
            model: model.to_string(),
            generated_at: Utc::now(),
        }
    }
}
