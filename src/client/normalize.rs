//! Reply normalization: turns whatever the remote agent sent back into one canonical string.
//!
//! Deployed agents answer in several shapes (`"text"`, `{"response": ...}`, `{"output": ...}`,
//! `[{...}]`, or plain text). The key order in [`REPLY_KEYS`] and the first-element rule for
//! arrays are part of the wire contract with those agents and must not change.

use crate::error_kind::ErrorKind;
use crate::types::outcome::Outcome;
use serde_json::Value;

/// Object keys searched for the reply, highest priority first.
pub const REPLY_KEYS: [&str; 6] = ["output", "response", "message", "text", "content", "answer"];

/// Placeholders some agents emit when they stringify a missing field.
const PLACEHOLDER_REPLIES: [&str; 2] = ["undefined", "null"];

/// Normalize a non-empty raw response body into an [`Outcome`].
///
/// Pure and deterministic. Blank bodies are rejected by the dispatcher before this is called.
pub fn normalize(raw: &str) -> Outcome {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        // Not JSON: the whole body is the reply.
        Err(_) => return Outcome::success(raw),
    };

    let content = match &parsed {
        Value::Array(items) => {
            let Some(first) = items.first() else {
                return Outcome::failure(ErrorKind::UnrecognizedShape, "empty array response");
            };
            match first {
                Value::String(s) => s.clone(),
                Value::Object(_) => extract_from_object(first),
                _ => to_text(&parsed),
            }
        }
        Value::Object(_) => extract_from_object(&parsed),
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) | Value::Null => to_text(&parsed),
    };

    if content.trim().is_empty() || PLACEHOLDER_REPLIES.contains(&content.as_str()) {
        return Outcome::failure(
            ErrorKind::UnrecognizedShape,
            "could not extract a valid response",
        );
    }

    Outcome::success(content)
}

/// First [`REPLY_KEYS`] entry with a non-null value, else the object itself serialized.
fn extract_from_object(obj: &Value) -> String {
    REPLY_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
        .map(value_as_text)
        .unwrap_or_else(|| to_text(obj))
}

/// Strings are taken as-is; anything else is rendered as JSON.
fn value_as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => to_text(other),
    }
}

fn to_text(v: &Value) -> String {
    // Serializing a `Value` cannot fail.
    serde_json::to_string(v).unwrap_or_default()
}
