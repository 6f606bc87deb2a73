//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the Gemini credential
pub const API_KEY_ENV: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub restore: RestoreConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of pre-built pages served for unmatched routes
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Generative model client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Unset means the transport's own behaviour applies
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}

impl GeminiConfig {
    /// Configured credential, ignoring blank values
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// What to do with finished styles when a later style hits a classified error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortPolicy {
    /// Return only the classified error; earlier successes are dropped
    #[default]
    Discard,
    /// Return earlier successes as a partial result when there are any
    ReturnPartial,
}

/// Restoration request handling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreConfig {
    #[serde(default)]
    pub abort_policy: AbortPolicy,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_true")]
    pub enforce_image_type: bool,
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    2
}

fn default_burst() -> u32 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Where best-effort event records are shipped
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    None,
    File,
    Http,
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("gemini.base_url", default_base_url())?
            .set_default("gemini.model", default_model())?
            .set_default("restore.abort_policy", "discard")?
            .set_default("restore.max_upload_bytes", default_max_upload_bytes() as i64)?
            .set_default("restore.enforce_image_type", true)?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.requests_per_second", default_rps() as i64)?
            .set_default("rate_limit.burst_size", default_burst() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with PHOTO_RESTORE__, e.g. PHOTO_RESTORE__SERVER__PORT)
            .add_source(
                Environment::with_prefix("PHOTO_RESTORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if settings.gemini.credential().is_none() {
            settings.gemini.api_key = std::env::var(API_KEY_ENV).ok();
        }

        Ok(settings)
    }

    /// Validate the configuration
    ///
    /// A missing credential is not an error here: the restore endpoint
    /// reports it per request as `CONFIG_ERROR`.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.restore.max_upload_bytes == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "restore.max_upload_bytes must be greater than 0".to_string(),
            )));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "gemini.model cannot be empty".to_string(),
            )));
        }

        match self.logging.sink.kind {
            SinkKind::File if self.logging.sink.path.is_none() => {
                return Err(AppError::Config(config::ConfigError::Message(
                    "logging.sink.path is required for the file sink".to_string(),
                )));
            }
            SinkKind::Http if self.logging.sink.url.is_none() => {
                return Err(AppError::Config(config::ConfigError::Message(
                    "logging.sink.url is required for the http sink".to_string(),
                )));
            }
            _ => {}
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                static_dir: None,
            },
            gemini: GeminiConfig {
                api_key: None,
                base_url: default_base_url(),
                model: default_model(),
                timeout_ms: None,
            },
            restore: RestoreConfig {
                abort_policy: AbortPolicy::default(),
                max_upload_bytes: default_max_upload_bytes(),
                enforce_image_type: true,
            },
            rate_limit: RateLimitConfig {
                enabled: true,
                requests_per_second: default_rps(),
                burst_size: default_burst(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
                sink: SinkConfig::default(),
            },
        }
    }
}
