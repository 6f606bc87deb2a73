//! Gemini `generateContent` client over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::model::traits::{GenerateContentRequest, GenerativeModel, ModelConnector, ModelError};

/// HTTP client for one model and one credential
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GeminiConfig, api_key: &str) -> Result<Self, ModelError> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder
            .build()
            .map_err(|e| ModelError::Init(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

fn transport_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::Timeout(e.to_string())
    } else {
        ModelError::Transport(e.to_string())
    }
}

/// Build an API error from a non-success response, preferring the Google
/// error envelope when the body carries one
fn api_error(code: u16, body: &str) -> ModelError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => ModelError::Api {
            code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => ModelError::Api {
            code,
            status: reqwest::StatusCode::from_u16(code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            message: body.chars().take(512).collect(),
        },
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<serde_json::Value, ModelError> {
        let url = self.endpoint();
        debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!(model = %self.model, status = %status, "Model API returned an error status");
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

/// Creates [`GeminiClient`]s from the configured model settings
pub struct GeminiConnector {
    config: GeminiConfig,
}

impl GeminiConnector {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }
}

impl ModelConnector for GeminiConnector {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn GenerativeModel>, ModelError> {
        Ok(Arc::new(GeminiClient::new(&self.config, api_key)?))
    }
}
