//! Completion backend trait — the seam between the retry engine and vendors.
//!
//! Every vendor (OpenAI, Anthropic, Gemini, DeepSeek, LM Studio, Ollama)
//! implements this trait. Adapters only shape requests and responses; retries
//! and model fallback live in [`crate::retry::RetryEngine`].

use async_trait::async_trait;

use crate::error::BackendError;

/// Trait that all completion backends must implement.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request for `prompt` to `model`.
    ///
    /// Issues exactly one HTTP call under the adapter's deadline. The text is
    /// returned verbatim; empty-after-trim detection is the engine's job.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, BackendError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
