//! Failure taxonomy for completion attempts.
//!
//! Adapters fail with a [`BackendError`]; the retry engine records each one as
//! an [`AttemptFailure`] and, when every attempt is spent, surfaces an
//! [`EngineError::AllAttemptsExhausted`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why a single completion attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Non-2xx response from the vendor.
    ApiError,
    /// 2xx response whose body lacks the expected text field.
    MalformedResponse,
    /// The per-attempt deadline elapsed.
    Timeout,
    /// Connection-level failure (refused, DNS, TLS, body read).
    Transport,
    /// The vendor returned text that is empty after trimming.
    EmptyCompletion,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ApiError => "api_error",
            FailureReason::MalformedResponse => "malformed_response",
            FailureReason::Timeout => "timeout",
            FailureReason::Transport => "transport",
            FailureReason::EmptyCompletion => "empty_completion",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// BackendError
// ─────────────────────────────────────────────

/// A classified failure from one adapter call.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub reason: FailureReason,
    pub message: String,
    /// HTTP status, when the vendor answered at all.
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            status: None,
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::ApiError,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureReason::MalformedResponse, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Transport, message)
    }

    pub fn timeout(vendor: &str, after: Duration) -> Self {
        Self::new(
            FailureReason::Timeout,
            format!("{vendor} request timed out after {} ms", after.as_millis()),
        )
    }

    pub fn empty_completion(model: &str) -> Self {
        Self::new(
            FailureReason::EmptyCompletion,
            format!("Model {model} returned an empty completion"),
        )
    }
}

// ─────────────────────────────────────────────
// Aggregation
// ─────────────────────────────────────────────

/// One failed attempt within a sweep.
#[derive(Clone, Debug)]
pub struct AttemptFailure {
    pub model: String,
    /// 1-based pass number.
    pub pass: u32,
    pub error: BackendError,
}

/// Every failure collected during one `generate` call, in attempt order.
#[derive(Clone, Debug, Default)]
pub struct AggregatedFailure {
    failures: Vec<AttemptFailure>,
}

impl AggregatedFailure {
    pub fn new(failures: Vec<AttemptFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        &self.failures
    }

    pub fn last(&self) -> Option<&AttemptFailure> {
        self.failures.last()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// The caller-visible message: the last failure's message.
    pub fn message(&self) -> String {
        self.last()
            .map(|f| f.error.message.clone())
            .unwrap_or_else(|| "all completion attempts failed".to_string())
    }
}

impl fmt::Display for AggregatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Errors from the retry engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    AllAttemptsExhausted(AggregatedFailure),
}

impl EngineError {
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            EngineError::AllAttemptsExhausted(agg) => agg.failures(),
        }
    }
}
