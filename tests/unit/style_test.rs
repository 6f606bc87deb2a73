//! Unit tests for style tables and error classification

use photo_restoration::{
    error::ErrorType,
    restore::{classify::classify_model_error, style::join_labels, RestorationStyle},
};

#[test]
fn test_style_wire_names() {
    for style in RestorationStyle::ALL {
        let json = serde_json::to_value(style).unwrap();
        assert_eq!(json, serde_json::Value::String(style.as_str().to_string()));
        assert_eq!(RestorationStyle::parse(style.as_str()), Some(style));
    }
}

#[test]
fn test_labels() {
    assert_eq!(RestorationStyle::Conservative.label(), "빈티지 보존");
    assert_eq!(RestorationStyle::Modern.label(), "모던 향상");
    assert_eq!(RestorationStyle::Balanced.label(), "하이브리드");
    assert_eq!(
        join_labels(&RestorationStyle::ALL),
        "빈티지 보존, 모던 향상, 하이브리드"
    );
}

#[test]
fn test_fallback_description() {
    assert_eq!(
        RestorationStyle::Balanced.fallback_description(),
        "balanced 스타일로 복원된 이미지"
    );
}

#[test]
fn test_every_prompt_asks_for_an_image() {
    for style in RestorationStyle::ALL {
        assert!(style.prompt().starts_with("Please restore this old damaged photograph"));
        assert!(style.prompt().contains("Generate the"));
    }
}

#[test]
fn test_classification_is_case_insensitive() {
    assert_eq!(classify_model_error("QUOTA"), Some(ErrorType::QuotaExceeded));
    assert_eq!(classify_model_error("Blocked"), Some(ErrorType::SafetyError));
    assert_eq!(classify_model_error("TimeOut"), Some(ErrorType::TimeoutError));
    assert_eq!(classify_model_error("INVALID_ARGUMENT"), Some(ErrorType::ValidationError));
    assert_eq!(classify_model_error("connection refused"), None);
}
