//! Ollama `/api/generate` backend (non-streaming).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{build_client, endpoint, send_json, text_at};
use crate::traits::CompletionBackend;

fn framed_prompt(prompt: &str) -> String {
    format!(
        "System: You are a helpful assistant with expertise in education and lesson planning. \
         Respond in Hebrew.\n\nUser: {prompt}"
    )
}

pub struct OllamaBackend {
    client: reqwest::Client,
    api_base: String,
    timeout: Duration,
}

impl OllamaBackend {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let url = endpoint(&self.api_base, "api/generate");
        debug!(provider = "Ollama", model = %model, url = %url, "Calling completion API");

        let body = json!({
            "model": model,
            "prompt": framed_prompt(prompt),
            "stream": false,
        });

        let request = self.client.post(&url).json(&body);
        let response = send_json(request, "Ollama", self.timeout).await?;

        // Ollama can answer 200 with an `error` field.
        if let Some(err) = text_at(&response, "/error") {
            return Err(BackendError::malformed(format!("Ollama API error: {err}")));
        }

        text_at(&response, "/response")
            .map(str::to_string)
            .ok_or_else(|| BackendError::malformed("Invalid response format from Ollama"))
    }

    fn display_name(&self) -> &str {
        "Ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_framed_prompt() {
        assert_eq!(
            framed_prompt("מה שלומך?"),
            "System: You are a helpful assistant with expertise in education and lesson planning. \
             Respond in Hebrew.\n\nUser: מה שלומך?"
        );
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "mistral",
                "stream": false,
                "prompt": framed_prompt("שאלה")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mistral",
                "response": "תשובה",
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let b = OllamaBackend::new(mock_server.uri(), Duration::from_secs(5));
        assert_eq!(b.complete("שאלה", "mistral").await.unwrap(), "תשובה");
    }

    #[tokio::test]
    async fn test_complete_not_found_error_string() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "error": "model 'llama9' not found" })),
            )
            .mount(&mock_server)
            .await;

        let b = OllamaBackend::new(mock_server.uri(), Duration::from_secs(5));
        let err = b.complete("x", "llama9").await.unwrap_err();
        assert_eq!(err.reason, FailureReason::ApiError);
        assert_eq!(err.message, "Ollama API error: model 'llama9' not found");
    }

    #[tokio::test]
    async fn test_error_field_on_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "out of memory" })))
            .mount(&mock_server)
            .await;

        let b = OllamaBackend::new(mock_server.uri(), Duration::from_secs(5));
        let err = b.complete("x", "mistral").await.unwrap_err();
        assert_eq!(err.reason, FailureReason::MalformedResponse);
        assert!(err.message.contains("out of memory"));
    }
}
