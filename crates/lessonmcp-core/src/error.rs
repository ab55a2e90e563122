//! Configuration errors.
//!
//! Raised while loading config or while building a backend / retry engine
//! from it. Never raised on the request path.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown provider '{0}' (expected one of: openai, anthropic, google, deepseek, ollama, lmstudio)")]
    UnknownProvider(String),

    #[error("no model identifiers configured for provider '{provider}'")]
    NoModels { provider: String },

    #[error("timeout must be greater than zero (provider '{provider}')")]
    InvalidTimeout { provider: String },

    #[error("retry count must be at least 1, got {0}")]
    InvalidRetries(u32),

    #[error("{env_key} is required for the {provider} provider")]
    MissingApiKey {
        provider: String,
        env_key: String,
    },

    #[error("{env_key} is required for the {provider} provider")]
    MissingBaseUrl {
        provider: String,
        env_key: String,
    },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
