use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScriptResponse {
    pub scripts: Vec<ScriptVariant>,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScriptVariant {
    pub id: Uuid,
    pub body: String,
}

impl ScriptResponse {
    pub fn new(scripts: Vec<String>, model: &str) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|body| ScriptVariant {
                    id: Uuid::new_v4(),
                    body,
                })
                .collect(),
            model: model.to_string(),
            generated_at: Utc::now(),
        }
    }
}
