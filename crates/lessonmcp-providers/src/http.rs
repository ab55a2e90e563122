//! Shared HTTP plumbing for the vendor adapters.
//!
//! One POST per attempt, bounded by a hard deadline that covers both sending
//! and reading the body. Status and body are classified into [`BackendError`]s
//! here so each adapter only deals with its own payload shape.

use std::time::Duration;

use lessonmcp_core::utils::truncate_string;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::BackendError;

/// Build a client that never reuses idle connections.
pub(crate) fn build_client() -> reqwest::Client {
    match reqwest::Client::builder().pool_max_idle_per_host(0).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client, falling back to defaults");
            reqwest::Client::new()
        }
    }
}

/// Send a prepared request and return the parsed 2xx JSON body.
///
/// The in-flight future is dropped when `deadline` elapses.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    vendor: &str,
    deadline: Duration,
) -> Result<Value, BackendError> {
    let exchange = async {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::transport(format!("{vendor} request failed: {e}")))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BackendError::transport(format!("{vendor} response could not be read: {e}"))
        })?;
        Ok::<_, BackendError>((status, body))
    };

    let (status, body) = tokio::time::timeout(deadline, exchange)
        .await
        .map_err(|_| BackendError::timeout(vendor, deadline))??;

    if !status.is_success() {
        let detail = error_detail(&body);
        warn!(
            provider = vendor,
            status = %status,
            error = %truncate_string(&detail, 200),
            "API error"
        );
        return Err(BackendError::api(
            status.as_u16(),
            format!("{vendor} API error: {detail}"),
        ));
    }

    debug!(provider = vendor, status = %status, bytes = body.len(), "Response received");

    serde_json::from_str(&body)
        .map_err(|e| BackendError::malformed(format!("{vendor} returned a non-JSON body: {e}")))
}

/// Pull the vendor's error text out of an error body.
///
/// Prefers `error.message`, then a bare `error` string (Ollama), then the raw
/// body.
pub(crate) fn error_detail(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| v.get("error").and_then(Value::as_str))
    });

    match message {
        Some(m) => m.to_string(),
        None if body.trim().is_empty() => "Unknown error".to_string(),
        None => body.trim().to_string(),
    }
}

/// Non-empty string at a JSON pointer.
pub(crate) fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Join a base URL and a path, tolerating a trailing slash on the base.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_detail_nested_message() {
        let body = r#"{"error": {"message": "Rate limit exceeded", "type": "rate_limit_error"}}"#;
        assert_eq!(error_detail(body), "Rate limit exceeded");
    }

    #[test]
    fn test_error_detail_bare_string() {
        assert_eq!(error_detail(r#"{"error": "model 'x' not found"}"#), "model 'x' not found");
    }

    #[test]
    fn test_error_detail_raw_body() {
        assert_eq!(error_detail("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_detail(""), "Unknown error");
        assert_eq!(error_detail(r#"{"detail": "nope"}"#), r#"{"detail": "nope"}"#);
    }

    #[test]
    fn test_text_at_rejects_empty() {
        let v = json!({"choices": [{"message": {"content": ""}}]});
        assert!(text_at(&v, "/choices/0/message/content").is_none());
        let v = json!({"choices": [{"message": {"content": "שלום"}}]});
        assert_eq!(text_at(&v, "/choices/0/message/content"), Some("שלום"));
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("http://localhost:1234/v1/", "/chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://localhost:11434", "api/generate"),
            "http://localhost:11434/api/generate"
        );
    }
}
