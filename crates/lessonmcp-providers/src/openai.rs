//! OpenAI chat completions backend.
//!
//! Also hosts the `/chat/completions` wire types shared with
//! [`crate::openai_compatible`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{build_client, endpoint, send_json, text_at};
use crate::traits::CompletionBackend;

const SYSTEM_PROMPT: &str = "You are a JSON-only API that must return valid JSON responses in Hebrew. \
Never include any text outside the JSON structure. Ensure all strings are properly escaped and encoded.";

// ─────────────────────────────────────────────
// Wire types (shared with OpenAI-compatible servers)
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f64,
    /// `-1` means "no limit" for LM Studio.
    pub max_tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, system: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 800,
            stream: None,
        }
    }
}

/// Text at `choices[0].message.content`.
pub(crate) fn chat_completion_text(body: &Value, vendor: &str) -> Result<String, BackendError> {
    text_at(body, "/choices/0/message/content")
        .map(str::to_string)
        .ok_or_else(|| BackendError::malformed(format!("Invalid response format from {vendor}")))
}

// ─────────────────────────────────────────────
// OpenAiBackend
// ─────────────────────────────────────────────

/// OpenAI `/chat/completions` with Bearer auth and a JSON-only system prompt.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiBackend {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn completions_url(&self) -> String {
        endpoint(&self.api_base, "chat/completions")
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let mut body = ChatCompletionRequest::new(model, SYSTEM_PROMPT, prompt);
        body.temperature = 0.3;
        body.max_tokens = 500;

        let url = self.completions_url();
        debug!(provider = "OpenAI", model = %model, url = %url, "Calling completion API");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response = send_json(request, "OpenAI", self.timeout).await?;
        chat_completion_text(&response, "OpenAI")
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
