//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use lessonmcp_core::config;
//!
//! let cfg = config::load_config(None).expect("valid configuration");
//! println!("Provider: {}", cfg.provider);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{apply_env_overrides, apply_overrides_from, env_prefix, load_config};
pub use schema::{
    Config, ModelList, ProviderConfig, ProviderKind, ProvidersConfig, RetryConfig, ServerConfig,
    ToolsConfig,
};
