//! Common traits and types for the generative model seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// `generateContent` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A single text or inline-image fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 encoded bytes
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

impl GenerateContentRequest {
    /// Instruction text followed by one inline image, asking for text and
    /// image output
    pub fn image_edit(instruction: &str, mime_type: &str, image_b64: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: instruction.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: image_b64,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Text, Modality::Image],
            },
        }
    }
}

/// Failure raised by a model call
///
/// The rendered message is what error classification inspects, so variants
/// keep the upstream wording.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model client initialization failed: {0}")]
    Init(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Model API error {code} {status}: {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("Unreadable model response: {0}")]
    Decode(String),
}

/// A generative model reachable with one credential
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    /// Issue one `generateContent` call and return the raw response body
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<serde_json::Value, ModelError>;
}

/// Builds a model client for a credential
pub trait ModelConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn GenerativeModel>, ModelError>;
}
