//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig` (one `ProviderConfig` per
//! backend), `RetryConfig`, `ServerConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — defaults, then `~/.lessonmcp/config.json`, then env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Which backend serves completions.
    pub provider: ProviderKind,
    pub providers: ProvidersConfig,
    pub retry: RetryConfig,
    pub server: ServerConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// The per-vendor settings for the selected provider.
    pub fn active_provider(&self) -> &ProviderConfig {
        self.providers.get(self.provider)
    }
}

// ─────────────────────────────────────────────
// Provider selection
// ─────────────────────────────────────────────

/// The six supported completion backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "lmstudio")]
    LmStudio,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Google,
        ProviderKind::DeepSeek,
        ProviderKind::Ollama,
        ProviderKind::LmStudio,
    ];

    /// Config / env key for this provider (`AI_PROVIDER` value).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Ollama => "ollama",
            ProviderKind::LmStudio => "lmstudio",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// Model lists
// ─────────────────────────────────────────────

/// Ordered list of model identifiers. Order is priority.
///
/// Authored either as a single identifier (`"gpt-4"`) or as a bracketed,
/// comma-separated list (`"[gpt-4o, gpt-4o-mini]"`). In JSON config files a
/// plain array is accepted too.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModelList(Vec<String>);

impl ModelList {
    /// Parse the env-var form. `"[a, b ,c]"` → `[a, b, c]`; anything without
    /// surrounding brackets is a single model.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => inner.split(',').map(str::to_string).collect::<Vec<_>>().into(),
            None => vec![raw.to_string()].into(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ModelList {
    /// Trims every entry and drops blanks.
    fn from(models: Vec<String>) -> Self {
        ModelList(
            models
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for ModelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl<'de> Deserialize<'de> for ModelList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) => ModelList::parse(&s),
            Raw::Many(v) => ModelList::from(v),
        })
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// User-facing settings for one backend. Anything left `None` falls back to
/// the provider registry's defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model identifier(s). `Some` with an empty list is a configuration error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelList>,
    /// Per-attempt deadline override in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ProviderConfig {
    /// Whether an API key is present (and non-blank).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// All provider configurations, one per supported backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub google: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub ollama: ProviderConfig,
    pub lmstudio: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Google => &self.google,
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::Ollama => &self.ollama,
            ProviderKind::LmStudio => &self.lmstudio,
        }
    }

    pub fn get_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::Google => &mut self.google,
            ProviderKind::DeepSeek => &mut self.deepseek,
            ProviderKind::Ollama => &mut self.ollama,
            ProviderKind::LmStudio => &mut self.lmstudio,
        }
    }
}

// ─────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────

/// Sweep settings shared by every provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Number of passes over the model list (`MODEL_RETRIES`). Must be ≥ 1.
    pub max_retries: u32,
    /// Per-attempt deadline applied to every provider (`MODEL_TIMEOUT_MS`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            timeout_ms: None,
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP transport settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool handler switches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Map Hebrew vocabulary in generated lessons to canonical English keys.
    pub remap_lesson_vocabulary: bool,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
