//! Completion backends for lessonmcp.
//!
//! # Architecture
//!
//! - [`traits::CompletionBackend`] — trait that all vendor adapters implement
//! - [`registry`] — static specs for the 6 supported providers, settings
//!   resolution, and [`registry::create_engine`]
//! - [`retry::RetryEngine`] — multi-model, multi-pass fallback over one backend
//! - [`error`] — `BackendError` / `FailureReason` / `EngineError`

pub mod anthropic;
pub mod error;
pub mod gemini;
mod http;
pub mod ollama;
pub mod openai;
pub mod openai_compatible;
pub mod registry;
pub mod retry;
pub mod traits;

// Re-export main types for convenience
pub use anthropic::AnthropicBackend;
pub use error::{AggregatedFailure, AttemptFailure, BackendError, EngineError, FailureReason};
pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use openai_compatible::OpenAiCompatibleBackend;
pub use registry::{create_backend, create_engine, ProviderSettings, ProviderSpec, PROVIDERS};
pub use retry::{Completion, RetryEngine};
pub use traits::CompletionBackend;
