//! Model module - Generative model trait and the Gemini HTTP client

pub mod gemini;
pub mod traits;

pub use gemini::{GeminiClient, GeminiConnector};
pub use traits::{GenerateContentRequest, GenerativeModel, ModelConnector, ModelError};
