//! Tool and normalizer errors, and their JSON-RPC error codes.

use lessonmcp_providers::EngineError;
use thiserror::Error;

/// JSON-RPC 2.0 error codes used across the transports.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Failures while pulling JSON out of free-form model text.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("No valid JSON structure found in response")]
    NoJsonFound,

    #[error("Invalid JSON response from AI: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unexpected JSON shape in AI response: expected {expected}, got {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Everything a tool call can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Completion(#[from] EngineError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// The JSON-RPC error code this failure maps to.
    pub fn code(&self) -> i32 {
        match self {
            ToolError::NotFound(_) => codes::METHOD_NOT_FOUND,
            ToolError::InvalidArguments { .. } => codes::INVALID_PARAMS,
            ToolError::Completion(_) | ToolError::Normalize(_) | ToolError::Failed(_) => {
                codes::INTERNAL_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonmcp_providers::{AggregatedFailure, AttemptFailure, BackendError};

    #[test]
    fn test_codes() {
        assert_eq!(ToolError::NotFound("x".into()).code(), -32601);
        assert_eq!(ToolError::invalid("chat_with_context", "missing field").code(), -32602);
        assert_eq!(ToolError::Normalize(NormalizeError::NoJsonFound).code(), -32603);
        assert_eq!(ToolError::Failed("boom".into()).code(), -32603);
    }

    #[test]
    fn test_completion_error_is_transparent() {
        let agg = AggregatedFailure::new(vec![AttemptFailure {
            model: "gpt-4".into(),
            pass: 1,
            error: BackendError::api(401, "OpenAI API error: Incorrect API key provided"),
        }]);
        let err = ToolError::from(EngineError::AllAttemptsExhausted(agg));
        assert_eq!(err.to_string(), "OpenAI API error: Incorrect API key provided");
        assert_eq!(err.code(), -32603);
    }

    #[test]
    fn test_invalid_arguments_message() {
        let err = ToolError::invalid("update_lesson_field", "message must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid arguments for update_lesson_field: message must not be empty"
        );
    }
}
