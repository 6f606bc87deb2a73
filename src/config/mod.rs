//! Configuration module

pub mod settings;

pub use settings::{
    AbortPolicy, GeminiConfig, LoggingConfig, RateLimitConfig, RestoreConfig, ServerConfig,
    Settings, SinkConfig, SinkKind, API_KEY_ENV,
};
