//! Core crate for lessonmcp — configuration, shared errors, and small helpers.
//!
//! Everything here is constructed once at process start and read-only
//! afterwards. The provider and tool crates receive a `&Config` (or pieces of
//! it) by injection; nothing reads the environment after loading.

pub mod config;
pub mod error;
pub mod utils;

pub use config::{Config, ModelList, ProviderConfig, ProviderKind};
pub use error::ConfigError;
