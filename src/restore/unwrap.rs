//! Extraction of the generated image from a raw `generateContent` response
//!
//! The response shape is owned by a third party and is checked one link at a
//! time: response → first candidate → content → parts. The first missing or
//! mis-shaped link ends the walk with a typed [`UnwrapError`].

use serde_json::Value;
use thiserror::Error;

/// Image and caption pulled out of one model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnwrappedResponse {
    /// Base64 image bytes from the first image part, if any
    pub image: Option<String>,
    /// Concatenated text of every text part
    pub caption: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnwrapError {
    #[error("No response received from AI service")]
    EmptyResponse,

    #[error("No candidates in AI response{}", block_suffix(.block_reason))]
    MissingCandidates { block_reason: Option<String> },

    #[error("Candidates is not an array")]
    CandidatesNotArray,

    #[error("Empty candidates array")]
    EmptyCandidates,

    #[error("First candidate is undefined")]
    MissingCandidate,

    #[error("Candidate content is undefined")]
    MissingContent,

    #[error("Candidate content parts is undefined")]
    MissingParts,

    #[error("Candidate content parts is not an array")]
    PartsNotArray,
}

fn block_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(" (prompt feedback: {})", r))
        .unwrap_or_default()
}

/// Look up `key`, treating JSON `null` the same as an absent field
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Walk a raw model response and collect its image and caption
pub fn unwrap_response(response: &Value) -> Result<UnwrappedResponse, UnwrapError> {
    if !response.is_object() {
        return Err(UnwrapError::EmptyResponse);
    }

    let candidates = field(response, "candidates").ok_or_else(|| UnwrapError::MissingCandidates {
        block_reason: field(response, "promptFeedback")
            .and_then(|feedback| non_empty_str(feedback.get("blockReason")))
            .map(str::to_string),
    })?;

    let parts = candidates
        .as_array()
        .ok_or(UnwrapError::CandidatesNotArray)?
        .first()
        .ok_or(UnwrapError::EmptyCandidates)
        .and_then(|candidate| {
            if candidate.is_null() {
                Err(UnwrapError::MissingCandidate)
            } else {
                field(candidate, "content").ok_or(UnwrapError::MissingContent)
            }
        })
        .and_then(|content| field(content, "parts").ok_or(UnwrapError::MissingParts))?
        .as_array()
        .ok_or(UnwrapError::PartsNotArray)?;

    let mut unwrapped = UnwrappedResponse::default();

    for part in parts.iter().filter(|part| !part.is_null()) {
        if let Some(text) = non_empty_str(part.get("text")) {
            unwrapped.caption.push_str(text);
        } else if let Some(data) = part
            .get("inlineData")
            .and_then(|inline| non_empty_str(inline.get("data")))
        {
            if unwrapped.image.is_none() {
                unwrapped.image = Some(data.to_string());
            }
        }
    }

    Ok(unwrapped)
}
