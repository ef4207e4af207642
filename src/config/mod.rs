use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Application configuration structure
///
/// Layered: struct defaults, then `config.yaml`, then `APP_`-prefixed
/// environment variables. The Gemini API key additionally falls back to
/// the `GEMINI_API_KEY` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_secs: u64,
    /// Never read from config.yaml in practice; resolved from the
    /// GEMINI_API_KEY environment variable when no layer sets it.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "script-studio".to_string(),
                version: "0.1.0".to_string(),
                debug: true,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            gemini: GeminiConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                text_model: "gemini-2.5-flash".to_string(),
                image_model: "gemini-2.5-flash-image".to_string(),
                timeout_secs: 120,
                api_key: None,
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        info!("Loading application configuration...");

        let mut config: AppConfig = Figment::new()
            // Start with default values
            .merge(Serialized::defaults(Self::default()))
            // Override with config file if present
            .merge(Yaml::file("config.yaml"))
            // Override with environment variables
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        config
            .gemini
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .context("GEMINI_API_KEY is not set and no gemini.api_key was configured")?;

        info!("Configuration loaded successfully");
        info!("name: {:?}", config.app.name);
        info!("Gemini API: {}", config.gemini.base_url);
        info!("Text model: {}", config.gemini.text_model);
        info!("Image model: {}", config.gemini.image_model);

        Ok(config)
    }
}
