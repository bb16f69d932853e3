use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload returned by the backend.
///
/// Most endpoints answer with `{"detail": "..."}`. Form-style endpoints answer
/// with field-keyed lists such as `{"current_password": ["Invalid password."]}`;
/// the first message found is used as the detail in that case.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Server-supplied explanation, when one could be extracted.
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// Creates an error response carrying a detail message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Extracts the detail from a raw response body.
    ///
    /// Never fails: an empty, non-JSON or unrecognised body yields a response
    /// without detail.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| detail_from_value(&value));
        Self { detail }
    }

    /// Checks if this error response has a detail message.
    #[must_use]
    pub const fn has_detail(&self) -> bool {
        self.detail.is_some()
    }
}

fn detail_from_value(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if let Some(detail) = object.get("detail") {
        return first_message(detail);
    }
    object.values().find_map(first_message)
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => f.write_str(detail),
            None => f.write_str("no detail provided"),
        }
    }
}
