//! Config loader — reads `~/.lessonmcp/config.json`, then `.env`, then the
//! process environment.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.lessonmcp/config.json` (or an explicit path)
//! 3. `.env` in the working directory (never overrides real env vars)
//! 4. Environment variables (`AI_PROVIDER`, `OPENAI_MODEL`, `MODEL_RETRIES`, …)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::{Config, ModelList, ProviderKind};
use crate::error::ConfigError;
use crate::utils::get_config_path;

/// Env var prefix for each provider's `_API_KEY` / `_BASE_URL` / `_MODEL`.
pub fn env_prefix(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI",
        ProviderKind::Anthropic => "ANTHROPIC",
        ProviderKind::Google => "GOOGLE",
        ProviderKind::DeepSeek => "DEEPSEEK",
        ProviderKind::Ollama => "OLLAMA",
        ProviderKind::LmStudio => "LM_STUDIO",
    }
}

/// Load configuration from the given (or default) path + `.env` + env vars.
///
/// A missing or unreadable file falls back to defaults; an unknown
/// `AI_PROVIDER` is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path);
    apply_env_overrides(config)
}

/// Load config from a specific file path, falling back to defaults.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    match read_config_file(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}", e);
            Config::default()
        }
    }
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply process environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: Config) -> Result<Config, ConfigError> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup (the process env in production,
/// a map in tests).
///
/// Supported variables:
/// - `AI_PROVIDER` → `provider`
/// - `<PREFIX>_API_KEY`, `<PREFIX>_BASE_URL`, `<PREFIX>_MODEL` for every
///   provider (`OPENAI`, `ANTHROPIC`, `GOOGLE`, `DEEPSEEK`, `OLLAMA`, `LM_STUDIO`)
/// - `MODEL_RETRIES` → `retry.max_retries`
/// - `MODEL_TIMEOUT_MS` → `retry.timeout_ms`
/// - `HTTP_HOST`, `HTTP_PORT` → `server`
pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("AI_PROVIDER") {
        config.provider = val.parse()?;
    }

    for kind in ProviderKind::ALL {
        let prefix = env_prefix(kind);
        let provider = config.providers.get_mut(kind);
        if let Some(val) = lookup(&format!("{prefix}_API_KEY")) {
            provider.api_key = Some(val);
        }
        if let Some(val) = lookup(&format!("{prefix}_BASE_URL")) {
            provider.base_url = Some(val);
        }
        if let Some(val) = lookup(&format!("{prefix}_MODEL")) {
            provider.model = Some(ModelList::parse(&val));
        }
    }

    if let Some(val) = lookup("MODEL_RETRIES") {
        match val.trim().parse::<u32>() {
            Ok(n) => config.retry.max_retries = n,
            Err(_) => warn!(value = %val, "Ignoring unparseable MODEL_RETRIES"),
        }
    }
    if let Some(val) = lookup("MODEL_TIMEOUT_MS") {
        match val.trim().parse::<u64>() {
            Ok(ms) => config.retry.timeout_ms = Some(ms),
            Err(_) => warn!(value = %val, "Ignoring unparseable MODEL_TIMEOUT_MS"),
        }
    }

    if let Some(val) = lookup("HTTP_HOST") {
        config.server.host = val;
    }
    if let Some(val) = lookup("HTTP_PORT") {
        match val.trim().parse::<u16>() {
            Ok(p) => config.server.port = p,
            Err(_) => warn!(value = %val, "Ignoring unparseable HTTP_PORT"),
        }
    }

    Ok(config)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
