//! Route table

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::handlers;
use crate::middleware::RateLimitLayer;
use crate::AppState;

/// Room for multipart boundaries and the styles field on top of the image
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let settings = state.settings.clone();
    let body_limit = settings
        .restore
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut api = Router::new()
        .route("/api/restore", post(handlers::restore))
        .route("/api/error-types", get(handlers::error_types))
        .layer(DefaultBodyLimit::max(body_limit));

    if settings.rate_limit.enabled {
        api = api.layer(RateLimitLayer::new(
            settings.rate_limit.requests_per_second,
            settings.rate_limit.burst_size,
        ));
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .merge(api);

    if let Some(static_dir) = &settings.server.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
