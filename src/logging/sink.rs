//! Best-effort shipping of log records to an external store
//!
//! Records are written from a spawned task. A failing or absent sink never
//! changes what the caller returns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{SinkConfig, SinkKind};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One shipped record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>, metadata: Option<serde_json::Value>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// Destination for log records
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write(&self, record: &LogRecord) -> Result<()>;
}

/// Appends records as JSON lines to a local file
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn write(&self, record: &LogRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}

/// POSTs each record as JSON to a document store endpoint
pub struct HttpSink {
    client: Client,
    url: String,
}

impl HttpSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create log sink client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LogSink for HttpSink {
    async fn write(&self, record: &LogRecord) -> Result<()> {
        self.client
            .post(&self.url)
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fire-and-forget handle to an optional [`LogSink`]
#[derive(Clone, Default)]
pub struct EventLog {
    sink: Option<Arc<dyn LogSink>>,
}

impl EventLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// An event log that drops every record
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        let sink: Arc<dyn LogSink> = match config.kind {
            SinkKind::None => return Ok(Self::disabled()),
            SinkKind::File => {
                let path = config.path.as_deref().ok_or_else(|| {
                    AppError::Internal("file log sink needs a path".to_string())
                })?;
                Arc::new(FileSink::new(path))
            }
            SinkKind::Http => {
                let url = config.url.as_deref().ok_or_else(|| {
                    AppError::Internal("http log sink needs a url".to_string())
                })?;
                Arc::new(HttpSink::new(url)?)
            }
        };
        debug!(kind = ?config.kind, "Event log sink configured");
        Ok(Self::new(sink))
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Ship a record in the background; must be called inside a tokio runtime
    pub fn emit(&self, level: LogLevel, message: impl Into<String>, metadata: Option<serde_json::Value>) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        let record = LogRecord::new(level, message, metadata);

        tokio::spawn(async move {
            if let Err(e) = sink.write(&record).await {
                warn!(error = %e, "Failed to ship log record");
            }
        });
    }

    pub fn info(&self, message: impl Into<String>, metadata: serde_json::Value) {
        self.emit(LogLevel::Info, message, Some(metadata));
    }

    pub fn warn(&self, message: impl Into<String>, metadata: serde_json::Value) {
        self.emit(LogLevel::Warn, message, Some(metadata));
    }

    pub fn error(&self, message: impl Into<String>, metadata: serde_json::Value) {
        self.emit(LogLevel::Error, message, Some(metadata));
    }
}
