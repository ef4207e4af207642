use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use script_studio::{
    config::{AppConfig, GeminiConfig},
    AppState, GeminiService,
};

pub const BOUNDARY: &str = "studio-test-boundary";

/// PNG magic bytes followed by filler, enough for mime sniffing.
pub fn png_bytes() -> Vec<u8> {
    png_bytes_of_len(24)
}

/// PNG magic bytes padded with zeros to the requested total size.
pub fn png_bytes_of_len(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len.max(data.len()), 0);
    data
}

pub fn test_state(gemini_base_url: &str) -> AppState {
    let mut config = AppConfig::default();
    config.gemini = GeminiConfig {
        base_url: gemini_base_url.to_string(),
        text_model: "gemini-2.5-flash".to_string(),
        image_model: "gemini-2.5-flash-image".to_string(),
        timeout_secs: 5,
        api_key: Some("test-key".to_string()),
    };

    let gemini = GeminiService::new(&config.gemini).expect("test gemini service");
    AppState {
        gemini: Arc::new(gemini),
        config: Arc::new(config),
    }
}

/// Builds multipart/form-data request bodies for handler tests.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
