//! Multi-model retry engine.
//!
//! Sweeps the configured models in priority order, `passes` times, and
//! returns the first non-empty completion. No backoff, no jitter: at most
//! `models × passes` attempts, each bounded by the adapter's own deadline.

use std::sync::Arc;

use lessonmcp_core::ConfigError;
use lessonmcp_core::ModelList;
use tracing::{debug, info, warn};

use crate::error::{AggregatedFailure, AttemptFailure, BackendError, EngineError};
use crate::traits::CompletionBackend;

/// A successful completion plus how it was obtained.
#[derive(Clone, Debug)]
pub struct Completion {
    pub text: String,
    /// The model that produced `text`.
    pub model: String,
    /// 1-based pass in which it succeeded.
    pub pass: u32,
    /// Attempts that failed before the success.
    pub failures: Vec<AttemptFailure>,
}

/// Tries candidate models in order over a bounded number of passes.
pub struct RetryEngine {
    backend: Arc<dyn CompletionBackend>,
    models: Vec<String>,
    passes: u32,
}

impl std::fmt::Debug for RetryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryEngine")
            .field("backend", &self.backend.display_name())
            .field("models", &self.models)
            .field("passes", &self.passes)
            .finish()
    }
}

impl RetryEngine {
    /// Blank model names are dropped; an empty list or zero passes is a
    /// configuration error.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        models: Vec<String>,
        passes: u32,
    ) -> Result<Self, ConfigError> {
        let models = ModelList::from(models);
        if models.is_empty() {
            return Err(ConfigError::NoModels {
                provider: backend.display_name().to_string(),
            });
        }
        if passes == 0 {
            return Err(ConfigError::InvalidRetries(passes));
        }

        info!(
            provider = backend.display_name(),
            models = %models,
            passes,
            "Retry engine ready"
        );

        Ok(Self {
            backend,
            models: models.into_vec(),
            passes,
        })
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    pub fn backend_name(&self) -> &str {
        self.backend.display_name()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Generate text for `prompt`, falling back across models and passes.
    pub async fn generate(&self, prompt: &str) -> Result<String, EngineError> {
        self.generate_detailed(prompt).await.map(|c| c.text)
    }

    /// Like [`generate`](Self::generate), but also reports the winning model,
    /// pass and the failures that preceded it.
    pub async fn generate_detailed(&self, prompt: &str) -> Result<Completion, EngineError> {
        let provider = self.backend.display_name();
        let mut failures: Vec<AttemptFailure> = Vec::new();

        for pass in 1..=self.passes {
            for model in &self.models {
                debug!(provider, model = %model, pass, passes = self.passes, "Attempting completion");

                let error = match self.backend.complete(prompt, model).await {
                    Ok(text) if !text.trim().is_empty() => {
                        info!(
                            provider,
                            model = %model,
                            pass,
                            failed_attempts = failures.len(),
                            "Completion succeeded"
                        );
                        return Ok(Completion {
                            text,
                            model: model.clone(),
                            pass,
                            failures,
                        });
                    }
                    Ok(_) => BackendError::empty_completion(model),
                    Err(e) => e,
                };

                warn!(
                    provider,
                    model = %model,
                    pass,
                    reason = %error.reason,
                    error = %error.message,
                    "Completion attempt failed, moving to next model"
                );
                failures.push(AttemptFailure {
                    model: model.clone(),
                    pass,
                    error,
                });
            }
        }

        let aggregated = AggregatedFailure::new(failures);
        warn!(
            provider,
            attempts = aggregated.len(),
            error = %aggregated,
            "All completion attempts failed"
        );
        Err(EngineError::AllAttemptsExhausted(aggregated))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
