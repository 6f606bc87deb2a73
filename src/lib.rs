//! Photo Restoration Service
//!
//! Accepts an old photograph and a list of restoration styles, asks a
//! generative image model for one restored variant per style and returns
//! the aggregated results.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod restore;

pub use error::{AppError, ErrorReport, ErrorType, Result};

use std::sync::Arc;

use config::Settings;
use logging::EventLog;
use model::ModelConnector;
use restore::Restorer;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<Settings>,
    pub connector: Arc<dyn ModelConnector>,
    pub restorer: Restorer,
    pub events: EventLog,
}

impl AppState {
    pub fn new(settings: Settings, connector: Arc<dyn ModelConnector>, events: EventLog) -> Self {
        let restorer = Restorer::new(settings.restore.abort_policy);
        Self {
            settings: Arc::new(settings),
            connector,
            restorer,
            events,
        }
    }
}
