//! Google Gemini `generateContent` backend.
//!
//! The API key travels in the query string and there is no system role, so the
//! education/Hebrew instruction is prepended to the user text.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::BackendError;
use crate::http::{build_client, endpoint, send_json, text_at};
use crate::traits::CompletionBackend;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

fn with_preamble(prompt: &str) -> String {
    format!(
        "You are a helpful assistant with expertise in education and lesson planning.\n\
         You must ALWAYS respond in Hebrew.\n\
         Here is the task:\n\n{prompt}"
    )
}

pub struct GeminiBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiBackend {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn request_body(prompt: &str) -> Value {
        let safety: Vec<Value> = HARM_CATEGORIES
            .iter()
            .map(|category| json!({ "category": category, "threshold": "BLOCK_MEDIUM_AND_ABOVE" }))
            .collect();

        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": with_preamble(prompt) }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 800
            },
            "safetySettings": safety
        })
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let url = endpoint(&self.api_base, &format!("models/{model}:generateContent"));
        debug!(provider = "Google AI", model = %model, url = %url, "Calling completion API");

        let request = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt));
        let response = send_json(request, "Google AI", self.timeout).await?;

        text_at(&response, "/candidates/0/content/parts/0/text")
            .map(str::to_string)
            .ok_or_else(|| BackendError::malformed("Invalid response structure from Gemini API"))
    }

    fn display_name(&self) -> &str {
        "Google AI"
    }
}
