//! Per-style restoration loop and result aggregation

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AbortPolicy;
use crate::error::{ErrorReport, ErrorType};
use crate::model::{GenerateContentRequest, GenerativeModel};
use crate::restore::classify::classify_model_error;
use crate::restore::style::{join_labels, RestorationStyle};
use crate::restore::unwrap::unwrap_response;
use crate::restore::validation::RestorationRequest;

/// Restored images are always reported as PNG
pub const RESULT_MIME_TYPE: &str = "image/png";

/// One restored image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationResult {
    /// Base64 encoded image bytes
    pub data: String,
    pub mime_type: String,
    pub style: RestorationStyle,
    pub description: String,
}

/// Aggregate result of one restore call
#[derive(Debug, Clone, PartialEq)]
pub struct RestorationOutcome {
    pub restored_images: Vec<RestorationResult>,
    pub failed_styles: Vec<RestorationStyle>,
    pub message: String,
    pub partial_success: bool,
}

enum StyleOutcome {
    Restored(RestorationResult),
    Failed,
    Abort(ErrorReport),
}

/// Runs the selected styles against a model, one after another
#[derive(Debug, Clone, Copy, Default)]
pub struct Restorer {
    abort_policy: AbortPolicy,
}

impl Restorer {
    pub fn new(abort_policy: AbortPolicy) -> Self {
        Self { abort_policy }
    }

    pub fn abort_policy(&self) -> AbortPolicy {
        self.abort_policy
    }

    /// Restore every requested style in order.
    ///
    /// Each style is attempted exactly once. A style whose response carries
    /// no image, or whose error is unclassified, is recorded as failed and
    /// the loop moves on; a classified model error stops the loop and is
    /// resolved through the abort policy.
    pub async fn restore(
        &self,
        model: &dyn GenerativeModel,
        request: &RestorationRequest,
    ) -> Result<RestorationOutcome, ErrorReport> {
        let image_b64 = STANDARD.encode(&request.image.bytes);
        let requested = request.styles.len();

        info!(
            model = %model.name(),
            styles = %request.styles.iter().map(RestorationStyle::as_str).collect::<Vec<_>>().join(", "),
            "Generating restored images"
        );

        let mut restored = Vec::with_capacity(requested);
        let mut failed = Vec::new();

        for (index, style) in request.styles.iter().copied().enumerate() {
            match restore_style(model, style, &request.image.mime_type, &image_b64).await {
                StyleOutcome::Restored(result) => restored.push(result),
                StyleOutcome::Failed => failed.push(style),
                StyleOutcome::Abort(report) => {
                    failed.push(style);
                    let unattempted = &request.styles[index + 1..];
                    return self.abort(report, restored, failed, unattempted, requested);
                }
            }
        }

        summarize(restored, failed, requested)
    }

    fn abort(
        &self,
        report: ErrorReport,
        restored: Vec<RestorationResult>,
        mut failed: Vec<RestorationStyle>,
        unattempted: &[RestorationStyle],
        requested: usize,
    ) -> Result<RestorationOutcome, ErrorReport> {
        match self.abort_policy {
            AbortPolicy::ReturnPartial if !restored.is_empty() => {
                warn!(
                    error_type = %report.error_type,
                    kept = restored.len(),
                    skipped = unattempted.len(),
                    "Restoration aborted, returning finished styles"
                );
                failed.extend_from_slice(unattempted);
                summarize(restored, failed, requested)
            }
            _ => {
                warn!(
                    error_type = %report.error_type,
                    discarded = restored.len(),
                    skipped = unattempted.len(),
                    "Restoration aborted"
                );
                Err(report)
            }
        }
    }
}

async fn restore_style(
    model: &dyn GenerativeModel,
    style: RestorationStyle,
    mime_type: &str,
    image_b64: &str,
) -> StyleOutcome {
    debug!(style = %style, "Attempting restoration");

    let request = GenerateContentRequest::image_edit(style.prompt(), mime_type, image_b64.to_string());

    let response = match model.generate_content(request).await {
        Ok(response) => response,
        Err(e) => {
            let message = e.to_string();
            return match classify_model_error(&message) {
                Some(error_type) => {
                    warn!(style = %style, error = %message, error_type = %error_type, "Model call failed");
                    StyleOutcome::Abort(ErrorReport::new(error_type).with_details(message))
                }
                None => {
                    warn!(style = %style, error = %message, "Model call failed, continuing with remaining styles");
                    StyleOutcome::Failed
                }
            };
        }
    };

    match unwrap_response(&response) {
        Ok(unwrapped) => match unwrapped.image {
            Some(data) => {
                info!(style = %style, bytes = data.len(), "Restoration completed");
                let description = if unwrapped.caption.is_empty() {
                    style.fallback_description()
                } else {
                    unwrapped.caption
                };
                StyleOutcome::Restored(RestorationResult {
                    data,
                    mime_type: RESULT_MIME_TYPE.to_string(),
                    style,
                    description,
                })
            }
            None => {
                warn!(style = %style, "No image data received");
                StyleOutcome::Failed
            }
        },
        Err(e) => {
            warn!(style = %style, error = %e, "Malformed model response");
            StyleOutcome::Failed
        }
    }
}

fn summarize(
    restored: Vec<RestorationResult>,
    failed: Vec<RestorationStyle>,
    requested: usize,
) -> Result<RestorationOutcome, ErrorReport> {
    if restored.is_empty() {
        warn!(failed = failed.len(), "All restoration attempts failed");

        return Err(if failed.len() == requested {
            ErrorReport::new(ErrorType::AiServiceError)
                .with_failed_styles(failed)
                .with_details("All restoration styles failed - likely API issue")
                .with_suggestions([
                    "몇 분 후 다시 시도해주세요",
                    "이미지 크기를 줄여서 시도해보세요",
                    "다른 이미지로 테스트해보세요",
                ])
        } else {
            ErrorReport::new(ErrorType::GenerationFailed)
                .with_failed_styles(failed)
                .with_details("No restored images were generated")
        });
    }

    let message = if failed.is_empty() {
        let styles: Vec<RestorationStyle> = restored.iter().map(|r| r.style).collect();
        format!("{} 스타일로 복원이 완료되었습니다!", join_labels(&styles))
    } else {
        format!(
            "{}/{} 스타일 복원 완료 (실패: {})",
            restored.len(),
            requested,
            join_labels(&failed)
        )
    };

    info!(restored = restored.len(), failed = failed.len(), "Generated restorations");

    Ok(RestorationOutcome {
        partial_success: !failed.is_empty(),
        restored_images: restored,
        failed_styles: failed,
        message,
    })
}
