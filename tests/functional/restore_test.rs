//! Functional tests for POST /api/restore

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use photo_restoration::{
    api::routes::create_router,
    config::{AbortPolicy, Settings},
    logging::EventLog,
    model::{traits::Part, GenerateContentRequest, GenerativeModel, ModelConnector, ModelError},
    restore::RestorationStyle,
    AppState,
};

const BOUNDARY: &str = "restore-test-boundary";
const PNG_BYTES: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// What the fake model does for one style
#[derive(Clone)]
enum Script {
    Image { data: &'static str, caption: &'static str },
    NoImage,
    Fail(&'static str),
}

struct ScriptedModel {
    scripts: HashMap<RestorationStyle, Script>,
    calls: Mutex<Vec<RestorationStyle>>,
}

impl ScriptedModel {
    fn new(scripts: &[(RestorationStyle, Script)]) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts.iter().cloned().collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<RestorationStyle> {
        self.calls.lock().clone()
    }
}

fn style_of(request: &GenerateContentRequest) -> RestorationStyle {
    let instruction = request.contents[0]
        .parts
        .iter()
        .find_map(|part| match part {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .expect("request carries an instruction");
    RestorationStyle::ALL
        .into_iter()
        .find(|style| style.prompt() == instruction)
        .expect("instruction matches a style prompt")
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_content(&self, request: GenerateContentRequest) -> Result<Value, ModelError> {
        let style = style_of(&request);
        self.calls.lock().push(style);

        match self.scripts.get(&style).cloned().unwrap_or(Script::NoImage) {
            Script::Image { data, caption } => {
                let mut parts = Vec::new();
                if !caption.is_empty() {
                    parts.push(json!({ "text": caption }));
                }
                parts.push(json!({ "inlineData": { "mimeType": "image/png", "data": data } }));
                Ok(json!({ "candidates": [{ "content": { "parts": parts } }] }))
            }
            Script::NoImage => Ok(json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] })),
            Script::Fail(message) => Err(ModelError::Transport(message.to_string())),
        }
    }
}

struct ScriptedConnector {
    model: Arc<ScriptedModel>,
    fail: bool,
}

impl ModelConnector for ScriptedConnector {
    fn connect(&self, _api_key: &str) -> Result<Arc<dyn GenerativeModel>, ModelError> {
        if self.fail {
            return Err(ModelError::Init("client construction failed".to_string()));
        }
        Ok(self.model.clone())
    }
}

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.gemini.api_key = Some("test-key".to_string());
    settings.rate_limit.enabled = false;
    settings
}

fn app_with(settings: Settings, model: Arc<ScriptedModel>, connector_fails: bool) -> Router {
    let connector = Arc::new(ScriptedConnector {
        model,
        fail: connector_fails,
    });
    create_router(Arc::new(AppState::new(settings, connector, EventLog::disabled())))
}

fn app(model: Arc<ScriptedModel>) -> Router {
    app_with(test_settings(), model, false)
}

fn multipart_body(image: Option<(&str, &str, &[u8])>, styles: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(styles) = styles {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"styles\"\r\n\r\n{styles}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn restore_request(styles: &str) -> Request<Body> {
    restore_request_with(Some(("photo.png", "image/png", &PNG_BYTES)), Some(styles))
}

fn restore_request_with(image: Option<(&str, &str, &[u8])>, styles: Option<&str>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/restore")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(image, styles)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn image(data: &'static str) -> Script {
    Script::Image { data, caption: "" }
}

#[tokio::test]
async fn test_missing_credential_is_config_error() {
    let model = ScriptedModel::new(&[]);
    let mut settings = test_settings();
    settings.gemini.api_key = None;

    let (status, body) = send(app_with(settings, model.clone(), false), restore_request(r#"["modern"]"#)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errorType"], "CONFIG_ERROR");
    assert_eq!(body["details"], "API key is not configured");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_unparseable_styles_rejected() {
    let model = ScriptedModel::new(&[]);
    let (status, body) = send(app(model.clone()), restore_request("[modern")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "복원 스타일 정보가 올바르지 않습니다.");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let model = ScriptedModel::new(&[]);
    let (status, body) = send(app(model), restore_request_with(None, Some(r#"["modern"]"#))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "이미지가 업로드되지 않았습니다.");
}

#[tokio::test]
async fn test_empty_style_list_rejected() {
    let model = ScriptedModel::new(&[]);
    let (status, body) = send(app(model), restore_request("[]")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "복원 스타일을 선택해주세요.");
}

#[tokio::test]
async fn test_unsupported_style_rejects_whole_request() {
    let model = ScriptedModel::new(&[(RestorationStyle::Modern, image("AAAA"))]);
    let (status, body) = send(app(model.clone()), restore_request(r#"["modern","vivid"]"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "지원하지 않는 복원 스타일입니다: vivid");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_rejected() {
    let model = ScriptedModel::new(&[]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/restore")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"styles":["modern"]}"#))
        .unwrap();

    let (status, body) = send(app(model), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_classified_error_aborts_and_skips_remaining_styles() {
    let model = ScriptedModel::new(&[
        (RestorationStyle::Conservative, Script::Fail("quota exceeded for today")),
        (RestorationStyle::Modern, image("MODERN")),
    ]);

    let (status, body) = send(app(model.clone()), restore_request(r#"["conservative","modern"]"#)).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["errorType"], "QUOTA_EXCEEDED");
    assert_eq!(body["details"], "Transport error: quota exceeded for today");
    assert_eq!(model.calls(), vec![RestorationStyle::Conservative]);
}

#[tokio::test]
async fn test_classified_error_discards_earlier_successes() {
    let model = ScriptedModel::new(&[
        (RestorationStyle::Modern, image("MODERN")),
        (RestorationStyle::Balanced, Script::Fail("Request was blocked by safety filters")),
    ]);

    let (status, body) = send(app(model.clone()), restore_request(r#"["modern","balanced"]"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "SAFETY_ERROR");
    assert!(body.get("restoredImages").is_none());
}

#[tokio::test]
async fn test_return_partial_policy_keeps_earlier_successes() {
    let model = ScriptedModel::new(&[
        (RestorationStyle::Modern, image("MODERN")),
        (RestorationStyle::Conservative, Script::Fail("deadline exceeded")),
        (RestorationStyle::Balanced, image("BALANCED")),
    ]);
    let mut settings = test_settings();
    settings.restore.abort_policy = AbortPolicy::ReturnPartial;

    let (status, body) = send(
        app_with(settings, model.clone(), false),
        restore_request(r#"["modern","conservative","balanced"]"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partialSuccess"], true);
    assert_eq!(body["failedStyles"], json!(["conservative", "balanced"]));
    assert_eq!(body["restoredImages"][0]["style"], "modern");
    assert_eq!(body["message"], "1/3 스타일 복원 완료 (실패: 빈티지 보존, 하이브리드)");
    assert_eq!(
        model.calls(),
        vec![RestorationStyle::Modern, RestorationStyle::Conservative]
    );
}

#[tokio::test]
async fn test_return_partial_policy_without_successes_reports_error() {
    let model = ScriptedModel::new(&[(RestorationStyle::Modern, Script::Fail("request timeout"))]);
    let mut settings = test_settings();
    settings.restore.abort_policy = AbortPolicy::ReturnPartial;

    let (status, body) = send(app_with(settings, model, false), restore_request(r#"["modern","balanced"]"#)).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["errorType"], "TIMEOUT_ERROR");
}

#[tokio::test]
async fn test_missing_image_part_is_partial_success() {
    let model = ScriptedModel::new(&[
        (RestorationStyle::Modern, image("MODERN")),
        (RestorationStyle::Balanced, Script::NoImage),
    ]);

    let (status, body) = send(app(model), restore_request(r#"["modern","balanced"]"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["partialSuccess"], true);
    assert_eq!(body["failedStyles"], json!(["balanced"]));
    assert_eq!(body["restoredImages"].as_array().unwrap().len(), 1);
    assert_eq!(body["restoredImages"][0]["style"], "modern");
    assert_eq!(body["restoredImages"][0]["data"], "MODERN");
    assert_eq!(body["restoredImages"][0]["mimeType"], "image/png");
    assert_eq!(body["message"], "1/2 스타일 복원 완료 (실패: 하이브리드)");
}

#[tokio::test]
async fn test_unclassified_failures_continue_then_service_error() {
    let model = ScriptedModel::new(&[
        (RestorationStyle::Conservative, Script::Fail("connection reset by peer")),
        (RestorationStyle::Modern, Script::Fail("internal error")),
    ]);

    let (status, body) = send(app(model.clone()), restore_request(r#"["conservative","modern"]"#)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errorType"], "AI_SERVICE_ERROR");
    assert_eq!(body["failedStyles"], json!(["conservative", "modern"]));
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
    assert_eq!(
        model.calls(),
        vec![RestorationStyle::Conservative, RestorationStyle::Modern]
    );
}

#[tokio::test]
async fn test_all_styles_succeed() {
    let model = ScriptedModel::new(&[
        (
            RestorationStyle::Conservative,
            Script::Image {
                data: "CONS",
                caption: "Scratches removed.",
            },
        ),
        (RestorationStyle::Modern, image("MODERN")),
        (RestorationStyle::Balanced, image("BAL")),
    ]);

    let (status, body) = send(
        app(model),
        restore_request(r#"["conservative","modern","balanced"]"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partialSuccess"], false);
    assert_eq!(body["failedStyles"], json!([]));
    assert_eq!(
        body["message"],
        "빈티지 보존, 모던 향상, 하이브리드 스타일로 복원이 완료되었습니다!"
    );
    assert_eq!(body["restoredImages"][0]["description"], "Scratches removed.");
    assert_eq!(body["restoredImages"][1]["description"], "modern 스타일로 복원된 이미지");
}

#[tokio::test]
async fn test_every_style_lands_in_exactly_one_bucket() {
    let outcomes = [image("IMG"), Script::NoImage, Script::Fail("server error 500")];
    let styles = RestorationStyle::ALL;

    for a in &outcomes {
        for b in &outcomes {
            for c in &outcomes {
                let model = ScriptedModel::new(&[
                    (styles[0], a.clone()),
                    (styles[1], b.clone()),
                    (styles[2], c.clone()),
                ]);
                let (status, body) = send(
                    app(model),
                    restore_request(r#"["conservative","modern","balanced"]"#),
                )
                .await;

                let mut seen: Vec<String> = body["failedStyles"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|s| s.as_str().unwrap().to_string())
                    .collect();

                if status == StatusCode::OK {
                    seen.extend(
                        body["restoredImages"]
                            .as_array()
                            .unwrap()
                            .iter()
                            .map(|r| r["style"].as_str().unwrap().to_string()),
                    );
                } else {
                    assert_eq!(body["errorType"], "AI_SERVICE_ERROR");
                }

                seen.sort();
                assert_eq!(seen, vec!["balanced", "conservative", "modern"]);
            }
        }
    }
}

#[tokio::test]
async fn test_connector_failure_is_ai_init_error() {
    let model = ScriptedModel::new(&[]);
    let (status, body) = send(app_with(test_settings(), model, true), restore_request(r#"["modern"]"#)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errorType"], "AI_INIT_ERROR");
}

#[tokio::test]
async fn test_non_image_upload_rejected() {
    let model = ScriptedModel::new(&[(RestorationStyle::Modern, image("MODERN"))]);
    let request = restore_request_with(
        Some(("notes.txt", "text/plain", b"hello")),
        Some(r#"["modern"]"#),
    );

    let (status, body) = send(app(model.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_body_over_upload_limit_is_validation_error() {
    let model = ScriptedModel::new(&[(RestorationStyle::Modern, image("MODERN"))]);
    let mut settings = test_settings();
    settings.restore.max_upload_bytes = 1024;

    let mut oversized = PNG_BYTES.to_vec();
    oversized.resize(200 * 1024, 0);
    let request = restore_request_with(
        Some(("big.png", "image/png", &oversized)),
        Some(r#"["modern"]"#),
    );

    let (status, body) = send(app_with(settings, model.clone(), false), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_file_over_upload_limit_reports_limit() {
    let model = ScriptedModel::new(&[(RestorationStyle::Modern, image("MODERN"))]);
    let mut settings = test_settings();
    settings.restore.max_upload_bytes = 1024;

    let mut large = PNG_BYTES.to_vec();
    large.resize(2048, 0);
    let request = restore_request_with(
        Some(("large.png", "image/png", &large)),
        Some(r#"["modern"]"#),
    );

    let (status, body) = send(app_with(settings, model.clone(), false), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "이미지 파일이 너무 큽니다. 최대 1KB까지 업로드할 수 있습니다.");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app(ScriptedModel::new(&[]))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_error_types_endpoint() {
    let request = Request::builder()
        .uri("/api/error-types")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(ScriptedModel::new(&[])), request).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 11);
    let quota = entries
        .iter()
        .find(|entry| entry["errorType"] == "QUOTA_EXCEEDED")
        .unwrap();
    assert_eq!(quota["title"], "일일 사용량 초과");
    assert_eq!(quota["canRetry"], false);
}
