//! Validation of the multipart restore form

use axum::extract::Multipart;
use serde_json::Value;
use tracing::debug;

use crate::config::RestoreConfig;
use crate::error::{AppError, ErrorReport};
use crate::restore::style::RestorationStyle;

const MSG_NO_IMAGE: &str = "이미지가 업로드되지 않았습니다.";
const MSG_STYLES_MALFORMED: &str = "복원 스타일 정보가 올바르지 않습니다.";
const MSG_NO_STYLES: &str = "복원 스타일을 선택해주세요.";
const MSG_NOT_AN_IMAGE: &str = "이미지 파일만 업로드할 수 있습니다. JPG 또는 PNG 파일을 사용해주세요.";

/// One multipart field
#[derive(Debug, Clone)]
pub enum FormField {
    File {
        bytes: Vec<u8>,
        content_type: Option<String>,
        file_name: String,
    },
    Text(String),
}

/// Raw restore form, before any checks
#[derive(Debug, Clone, Default)]
pub struct RestoreForm {
    pub image: Option<FormField>,
    pub styles: Option<String>,
}

/// Uploaded photo with its declared (or sniffed) MIME type
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// A validated restoration request
#[derive(Debug, Clone)]
pub struct RestorationRequest {
    pub image: UploadedImage,
    /// Client order, duplicates kept
    pub styles: Vec<RestorationStyle>,
}

impl RestoreForm {
    /// Read the `image` and `styles` fields; other fields are ignored
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = RestoreForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;

                    form.image = Some(match file_name {
                        Some(file_name) => FormField::File {
                            bytes: bytes.to_vec(),
                            content_type,
                            file_name,
                        },
                        None => FormField::Text(String::from_utf8_lossy(&bytes).into_owned()),
                    });
                }
                "styles" => {
                    form.styles = Some(field.text().await?);
                }
                other => {
                    debug!(field = %other, "Ignoring unexpected form field");
                }
            }
        }

        Ok(form)
    }

    /// Run the input checks in order, stopping at the first failure
    pub fn validate(self, config: &RestoreConfig) -> Result<RestorationRequest, ErrorReport> {
        let (bytes, content_type, file_name) = match self.image {
            Some(FormField::File {
                bytes,
                content_type,
                file_name,
            }) => (bytes, content_type, file_name),
            Some(FormField::Text(_)) => {
                return Err(ErrorReport::validation(MSG_NO_IMAGE)
                    .with_details("image field is not a file"))
            }
            None => return Err(ErrorReport::validation(MSG_NO_IMAGE)),
        };

        let styles = parse_styles(self.styles.as_deref())?;

        if bytes.len() > config.max_upload_bytes {
            return Err(ErrorReport::validation(format!(
                "이미지 파일이 너무 큽니다. 최대 {}까지 업로드할 수 있습니다.",
                format_limit(config.max_upload_bytes)
            ))
            .with_details(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                config.max_upload_bytes
            )));
        }

        let declared = content_type
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        let mime_type = match declared {
            Some(ct) if ct.starts_with("image/") => ct,
            Some(ct) if config.enforce_image_type => {
                return Err(ErrorReport::validation(MSG_NOT_AN_IMAGE)
                    .with_details(format!("declared content type {}", ct)))
            }
            Some(ct) => ct,
            None => match sniff_image_mime(&bytes) {
                Some(mime) => mime.to_string(),
                None if config.enforce_image_type => {
                    return Err(ErrorReport::validation(MSG_NOT_AN_IMAGE)
                        .with_details("content type missing and bytes are not a known image"))
                }
                None => "application/octet-stream".to_string(),
            },
        };

        Ok(RestorationRequest {
            image: UploadedImage {
                bytes,
                mime_type,
                file_name,
            },
            styles,
        })
    }
}

/// Parse the JSON-encoded style list
///
/// A missing field or JSON `null` counts as an empty selection. Every
/// unknown entry is reported; nothing is filtered out.
pub fn parse_styles(raw: Option<&str>) -> Result<Vec<RestorationStyle>, ErrorReport> {
    let value = match raw {
        Some(raw) => serde_json::from_str::<Value>(raw).map_err(|e| {
            ErrorReport::validation(MSG_STYLES_MALFORMED).with_details(e.to_string())
        })?,
        None => Value::Null,
    };

    let entries = match value {
        Value::Null => Vec::new(),
        Value::Array(entries) => entries,
        other => {
            return Err(ErrorReport::validation(MSG_STYLES_MALFORMED)
                .with_details(format!("expected a JSON array, got {}", other)))
        }
    };

    if entries.is_empty() {
        return Err(ErrorReport::validation(MSG_NO_STYLES));
    }

    let mut styles = Vec::with_capacity(entries.len());
    let mut unsupported = Vec::new();

    for entry in entries {
        match entry.as_str().and_then(RestorationStyle::parse) {
            Some(style) => styles.push(style),
            None => unsupported.push(match entry {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        }
    }

    if !unsupported.is_empty() {
        return Err(ErrorReport::validation(format!(
            "지원하지 않는 복원 스타일입니다: {}",
            unsupported.join(", ")
        )));
    }

    Ok(styles)
}

/// Human-readable upload limit, rounded up so it is never shown as zero
fn format_limit(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;

    if bytes >= MIB {
        format!("{}MB", bytes.div_ceil(MIB))
    } else if bytes >= KIB {
        format!("{}KB", bytes.div_ceil(KIB))
    } else {
        format!("{}B", bytes)
    }
}

/// Detect an image MIME type from magic bytes
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }

    None
}
