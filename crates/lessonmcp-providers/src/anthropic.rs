//! Anthropic Messages API backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{build_client, endpoint, send_json, text_at};
use crate::traits::CompletionBackend;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant with expertise in education and lesson planning. Respond in Hebrew.";
const API_VERSION: &str = "2023-06-01";

/// `POST {base}/messages` with `x-api-key` auth and a top-level system field.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl AnthropicBackend {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let url = endpoint(&self.api_base, "messages");
        debug!(provider = "Anthropic", model = %model, url = %url, "Calling completion API");

        let body = json!({
            "model": model,
            "max_tokens": 500,
            "messages": [{ "role": "user", "content": prompt }],
            "system": SYSTEM_PROMPT,
        });

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let response = send_json(request, "Anthropic", self.timeout).await?;

        text_at(&response, "/content/0/text")
            .map(str::to_string)
            .ok_or_else(|| BackendError::malformed("Empty response from Anthropic"))
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }
}
