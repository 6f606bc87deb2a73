//! Keyword classification of model call failures

use crate::error::ErrorType;

/// Keyword groups checked in priority order
const KEYWORD_RULES: &[(&[&str], ErrorType)] = &[
    (&["quota", "limit"], ErrorType::QuotaExceeded),
    (&["safety", "blocked"], ErrorType::SafetyError),
    (&["timeout", "deadline"], ErrorType::TimeoutError),
    (&["invalid", "format"], ErrorType::ValidationError),
];

/// Classify a model error message, case-insensitively.
///
/// `Some` means the whole restoration request must stop with that code;
/// `None` means only the current style failed.
pub fn classify_model_error(message: &str) -> Option<ErrorType> {
    let lowered = message.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, error_type)| *error_type)
}
