//! OpenAI-compatible servers: DeepSeek-style hosted endpoints and LM Studio.
//!
//! Both speak `/chat/completions`; they differ in auth, token limit and the
//! system instruction.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{build_client, endpoint, send_json};
use crate::openai::{chat_completion_text, ChatCompletionRequest};
use crate::traits::CompletionBackend;

const DEEPSEEK_SYSTEM_PROMPT: &str =
    "You are a helpful assistant with expertise in education and lesson planning. Respond in Hebrew.";

const LM_STUDIO_SYSTEM_PROMPT: &str =
    "You are a helpful assistant with expertise in education and lesson planning. Respond in Hebrew. \
Make sure to maintain proper spacing between words and use proper line breaks for readability.";

/// A `/chat/completions` server that is not OpenAI itself.
pub struct OpenAiCompatibleBackend {
    client: reqwest::Client,
    display_name: &'static str,
    api_base: String,
    /// Bearer token; `None` sends no auth header.
    api_key: Option<String>,
    system_prompt: &'static str,
    max_tokens: i64,
    timeout: Duration,
}

impl OpenAiCompatibleBackend {
    /// Hosted DeepSeek-style endpoint (Bearer auth, 800 tokens).
    pub fn deepseek(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            display_name: "DeepSeek",
            api_base: api_base.into(),
            api_key: Some(api_key.into()),
            system_prompt: DEEPSEEK_SYSTEM_PROMPT,
            max_tokens: 800,
            timeout,
        }
    }

    /// Local LM Studio server (no auth, unlimited tokens).
    pub fn lm_studio(api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            display_name: "LM Studio",
            api_base: api_base.into(),
            api_key: None,
            system_prompt: LM_STUDIO_SYSTEM_PROMPT,
            max_tokens: -1,
            timeout,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let mut body = ChatCompletionRequest::new(model, self.system_prompt, prompt);
        body.max_tokens = self.max_tokens;
        body.stream = Some(false);

        let url = endpoint(&self.api_base, "chat/completions");
        debug!(provider = self.display_name, model = %model, url = %url, "Calling completion API");

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        let response = send_json(request, self.display_name, self.timeout).await?;
        chat_completion_text(&response, self.display_name)
    }

    fn display_name(&self) -> &str {
        self.display_name
    }
}
