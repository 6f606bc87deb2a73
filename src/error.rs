//! Common error types for the restoration service
//!
//! Two layers live here: [`AppError`] for internal plumbing failures, and
//! [`ErrorReport`] / [`ErrorType`], the client-facing error shape returned by
//! every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::restore::style::RestorationStyle;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Request body error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error codes returned in the `errorType` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ConfigError,
    ValidationError,
    AiInitError,
    QuotaExceeded,
    SafetyError,
    TimeoutError,
    AiServiceError,
    GenerationFailed,
    NetworkError,
    ParseError,
    UnknownError,
}

impl ErrorType {
    pub const ALL: [ErrorType; 11] = [
        ErrorType::ConfigError,
        ErrorType::ValidationError,
        ErrorType::AiInitError,
        ErrorType::QuotaExceeded,
        ErrorType::SafetyError,
        ErrorType::TimeoutError,
        ErrorType::AiServiceError,
        ErrorType::GenerationFailed,
        ErrorType::NetworkError,
        ErrorType::ParseError,
        ErrorType::UnknownError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ConfigError => "CONFIG_ERROR",
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::AiInitError => "AI_INIT_ERROR",
            ErrorType::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorType::SafetyError => "SAFETY_ERROR",
            ErrorType::TimeoutError => "TIMEOUT_ERROR",
            ErrorType::AiServiceError => "AI_SERVICE_ERROR",
            ErrorType::GenerationFailed => "GENERATION_FAILED",
            ErrorType::NetworkError => "NETWORK_ERROR",
            ErrorType::ParseError => "PARSE_ERROR",
            ErrorType::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status used when this error ends a request
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorType::ValidationError | ErrorType::SafetyError => StatusCode::BAD_REQUEST,
            ErrorType::TimeoutError => StatusCode::REQUEST_TIMEOUT,
            ErrorType::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorType::GenerationFailed | ErrorType::ParseError | ErrorType::UnknownError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorType::ConfigError
            | ErrorType::AiInitError
            | ErrorType::AiServiceError
            | ErrorType::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Default user-facing message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorType::ConfigError => "서버 설정 오류가 발생했습니다. 관리자에게 문의해주세요.",
            ErrorType::ValidationError => {
                "이미지 형식이 지원되지 않습니다. JPG 또는 PNG 파일을 사용해주세요."
            }
            ErrorType::AiInitError => "AI 서비스 초기화에 실패했습니다. 잠시 후 다시 시도해주세요.",
            ErrorType::QuotaExceeded => "일일 사용량 한도에 도달했습니다. 내일 다시 시도해주세요.",
            ErrorType::SafetyError => {
                "업로드된 이미지가 안전 정책에 위배됩니다. 다른 이미지를 시도해주세요."
            }
            ErrorType::TimeoutError => {
                "처리 시간이 초과되었습니다. 이미지 크기를 줄이거나 잠시 후 다시 시도해주세요."
            }
            ErrorType::AiServiceError => {
                "현재 AI 서비스에 일시적인 문제가 있습니다. 잠시 후 다시 시도해주세요."
            }
            ErrorType::GenerationFailed => {
                "이미지 복원에 실패했습니다. 다른 이미지를 시도하거나 잠시 후 다시 시도해주세요."
            }
            ErrorType::NetworkError => {
                "네트워크 연결에 문제가 있습니다. 인터넷 연결을 확인하고 다시 시도해주세요."
            }
            ErrorType::ParseError => {
                "서버 응답을 처리하는 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요."
            }
            ErrorType::UnknownError => "이미지 복원 중 오류가 발생했습니다: 알 수 없는 오류",
        }
    }

    /// How a client should render this error
    pub fn presentation(&self) -> ErrorPresentation {
        let (title, icon) = match self {
            ErrorType::QuotaExceeded => ("일일 사용량 초과", "clock"),
            ErrorType::SafetyError => ("안전 정책 위배", "shield"),
            ErrorType::NetworkError => ("네트워크 오류", "wifi"),
            ErrorType::TimeoutError => ("처리 시간 초과", "clock"),
            ErrorType::ConfigError => ("서버 설정 오류", "server"),
            ErrorType::AiInitError => ("AI 서비스 오류", "server"),
            ErrorType::AiServiceError => ("AI 서비스 일시 중단", "server"),
            ErrorType::ValidationError => ("입력 오류", "alert-triangle"),
            ErrorType::GenerationFailed | ErrorType::ParseError | ErrorType::UnknownError => {
                ("오류 발생", "alert-triangle")
            }
        };

        let suggestions: &'static [&'static str] = match self {
            ErrorType::QuotaExceeded => &[
                "내일 다시 시도해주세요",
                "개인 프로젝트로 일일 사용량이 제한되어 있습니다",
            ],
            ErrorType::SafetyError => &[
                "다른 이미지를 업로드해주세요",
                "개인정보나 부적절한 내용이 포함된 이미지는 처리할 수 없습니다",
            ],
            ErrorType::NetworkError => &["인터넷 연결을 확인해주세요", "잠시 후 다시 시도해주세요"],
            ErrorType::TimeoutError => &[
                "이미지 크기를 줄여서 다시 시도해주세요",
                "서버가 바쁠 수 있으니 잠시 후 다시 시도해주세요",
            ],
            ErrorType::ConfigError | ErrorType::AiInitError => &[
                "서버에 일시적인 문제가 발생했습니다",
                "잠시 후 다시 시도하거나 관리자에게 문의해주세요",
            ],
            ErrorType::AiServiceError => &[
                "AI 서비스에 일시적인 문제가 있습니다",
                "5-10분 후 다시 시도해주세요",
                "이미지 크기를 줄여서 시도해보세요",
            ],
            _ => &["잠시 후 다시 시도해주세요", "문제가 계속되면 관리자에게 문의해주세요"],
        };

        let extra_tips: &'static [&'static str] = match self {
            ErrorType::AiServiceError => &[
                "이미지 크기: 1-2MB 이하 권장",
                "파일 형식: JPG 또는 PNG",
                "복원 스타일: 한 번에 1-2개만 선택",
            ],
            _ => &[],
        };

        ErrorPresentation {
            error_type: *self,
            title,
            icon,
            suggestions,
            extra_tips,
            can_retry: !matches!(
                self,
                ErrorType::QuotaExceeded | ErrorType::SafetyError | ErrorType::ConfigError
            ),
            show_contact: matches!(
                self,
                ErrorType::ConfigError
                    | ErrorType::AiInitError
                    | ErrorType::AiServiceError
                    | ErrorType::UnknownError
            ),
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering hints for an error code (title, icon, remediation)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPresentation {
    pub error_type: ErrorType,
    pub title: &'static str,
    pub icon: &'static str,
    pub suggestions: &'static [&'static str],
    pub extra_tips: &'static [&'static str],
    pub can_retry: bool,
    pub show_contact: bool,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    #[serde(rename = "error")]
    pub message: String,
    pub error_type: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_styles: Option<Vec<RestorationStyle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ErrorReport {
    /// Report carrying the default message of `error_type`
    pub fn new(error_type: ErrorType) -> Self {
        Self {
            message: error_type.message().to_string(),
            error_type,
            details: None,
            failed_styles: None,
            suggestions: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::ValidationError).with_message(message)
    }

    /// Catch-all report for failures nothing else recognised
    pub fn unknown(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::new(ErrorType::UnknownError)
            .with_message(format!("이미지 복원 중 오류가 발생했습니다: {}", detail))
            .with_details(detail)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_failed_styles(mut self, styles: Vec<RestorationStyle>) -> Self {
        self.failed_styles = Some(styles);
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = Some(suggestions.into_iter().map(Into::into).collect());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.error_type.status()
    }
}

impl From<AppError> for ErrorReport {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::Config(_) => ErrorReport::new(ErrorType::ConfigError).with_details(err.to_string()),
            AppError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ErrorReport::validation("이미지 파일이 너무 큽니다. 더 작은 이미지를 사용해주세요.")
                    .with_details(err.to_string())
            }
            AppError::Multipart(_) | AppError::Json(_) => {
                ErrorReport::new(ErrorType::ParseError).with_details(err.to_string())
            }
            // No restore-path call returns HttpClient today; model transport errors
            // arrive as ModelError and go through keyword classification instead.
            AppError::HttpClient(e) if e.is_connect() || e.is_request() || e.is_timeout() => {
                ErrorReport::new(ErrorType::NetworkError).with_details(err.to_string())
            }
            AppError::HttpClient(_) | AppError::Io(_) | AppError::Internal(_) => {
                ErrorReport::unknown(err.to_string())
            }
        }
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ErrorReport::from(self).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
