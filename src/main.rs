//! Main entry point for the Photo Restoration Service

use photo_restoration::{
    api,
    config::Settings,
    logging::{self, EventLog},
    model::GeminiConnector,
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    logging::init_tracing(&settings.logging);

    info!("Starting Photo Restoration Service");
    info!(
        "Loaded configuration: server={}:{}, model={}, abort_policy={:?}",
        settings.server.host, settings.server.port, settings.gemini.model, settings.restore.abort_policy
    );

    if settings.gemini.credential().is_none() {
        warn!("Gemini API key is not configured; restore requests will fail with CONFIG_ERROR");
    }

    let events = EventLog::from_config(&settings.logging.sink)?;
    let connector = Arc::new(GeminiConnector::new(settings.gemini.clone()));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app_state = Arc::new(AppState::new(settings, connector, events));

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
