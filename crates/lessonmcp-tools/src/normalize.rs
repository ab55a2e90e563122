//! Response normalizer — pulls parseable JSON out of free-form model text.
//!
//! Models wrap JSON in Markdown fences, add a chatty preamble, or trail off
//! with an explanation. The normalizer strips fences, then takes the widest
//! `[...]` span, then the widest `{...}` span, and keeps the first that parses.
//! It never checks field shapes.

use serde_json::Value;
use tracing::debug;

use crate::error::NormalizeError;

/// What to do with a bare object when no array was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectWrap {
    /// Return the object as-is.
    Bare,
    /// Return it as a one-element array (`[obj]`).
    WrapInArray,
}

/// Remove Markdown code fence markers (```` ```json ```` and ```` ``` ````,
/// each with one optional trailing newline) anywhere in the text.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
}

/// Greedy span from the first `open` to the last `close`.
pub(crate) fn greedy_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Extract a JSON array or object from `text`.
///
/// Returns the JSON text trimmed, not re-serialized, so key order and
/// formatting survive.
pub fn extract_json(text: &str, wrap: ObjectWrap) -> Result<String, NormalizeError> {
    let cleaned = strip_fences(text);
    let mut last_error = None;

    if let Some(candidate) = greedy_span(&cleaned, '[', ']') {
        match serde_json::from_str::<Value>(candidate) {
            Ok(_) => {
                debug!(len = candidate.len(), "Found JSON array");
                return Ok(candidate.trim().to_string());
            }
            Err(e) => last_error = Some(e),
        }
    }

    if let Some(candidate) = greedy_span(&cleaned, '{', '}') {
        match serde_json::from_str::<Value>(candidate) {
            Ok(_) => {
                debug!(len = candidate.len(), ?wrap, "Found JSON object");
                let candidate = candidate.trim();
                return Ok(match wrap {
                    ObjectWrap::Bare => candidate.to_string(),
                    ObjectWrap::WrapInArray => format!("[{candidate}]"),
                });
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => NormalizeError::InvalidJson(e),
        None => NormalizeError::NoJsonFound,
    })
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
