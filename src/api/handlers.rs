//! Request handlers

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::error::{ErrorPresentation, ErrorReport, ErrorType};
use crate::restore::{RestorationOutcome, RestorationResult, RestorationStyle, RestoreForm};
use crate::AppState;

/// Success body of `POST /api/restore`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub success: bool,
    pub restored_images: Vec<RestorationResult>,
    pub message: String,
    pub partial_success: bool,
    pub failed_styles: Vec<RestorationStyle>,
}

impl From<RestorationOutcome> for RestoreResponse {
    fn from(outcome: RestorationOutcome) -> Self {
        Self {
            success: true,
            restored_images: outcome.restored_images,
            message: outcome.message,
            partial_success: outcome.partial_success,
            failed_styles: outcome.failed_styles,
        }
    }
}

/// `POST /api/restore`
pub async fn restore(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("restore", %request_id);

    match run_restore(&state, multipart).instrument(span).await {
        Ok(outcome) => {
            state.events.info(
                "Restoration completed",
                json!({
                    "requestId": request_id,
                    "restored": outcome.restored_images.len(),
                    "failedStyles": outcome.failed_styles,
                    "partialSuccess": outcome.partial_success,
                }),
            );
            Json(RestoreResponse::from(outcome)).into_response()
        }
        Err(report) => {
            let metadata = json!({
                "requestId": request_id,
                "errorType": report.error_type,
                "details": report.details,
                "failedStyles": report.failed_styles,
            });
            if report.error_type == ErrorType::ValidationError {
                state.events.warn("Restoration rejected", metadata);
            } else {
                state.events.error("Restoration failed", metadata);
            }
            report.into_response()
        }
    }
}

async fn run_restore(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<RestorationOutcome, ErrorReport> {
    let api_key = state.settings.gemini.credential().ok_or_else(|| {
        error!("Gemini API key is missing");
        ErrorReport::new(ErrorType::ConfigError).with_details("API key is not configured")
    })?;

    let multipart = multipart.map_err(|rejection| {
        ErrorReport::validation("요청 형식이 올바르지 않습니다. 이미지와 복원 스타일을 함께 보내주세요.")
            .with_details(rejection.body_text())
    })?;

    let form = RestoreForm::from_multipart(multipart).await?;
    let request = form.validate(&state.settings.restore).map_err(|report| {
        warn!(reason = %report.message, "Restore request rejected");
        report
    })?;

    info!(
        file_name = %request.image.file_name,
        mime_type = %request.image.mime_type,
        size = request.image.bytes.len(),
        styles = request.styles.len(),
        "Restore request accepted"
    );

    let model = state.connector.connect(api_key).map_err(|e| {
        error!(error = %e, "Failed to initialize model client");
        ErrorReport::new(ErrorType::AiInitError).with_details(e.to_string())
    })?;

    state.restorer.restore(model.as_ref(), &request).await
}

/// `GET /api/error-types`
pub async fn error_types() -> Json<Vec<ErrorPresentation>> {
    Json(ErrorType::ALL.iter().map(ErrorType::presentation).collect())
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
