//! Provider registry — static specs for the six supported backends.
//!
//! Each `ProviderSpec` describes how to connect to a vendor: env var names,
//! default base URL, which settings are mandatory, default model and deadline.
//! [`ProviderSettings::resolve`] merges a spec with the user's config and
//! validates it; [`create_backend`] turns the result into an adapter.

use std::sync::Arc;
use std::time::Duration;

use lessonmcp_core::config::{Config, ModelList, ProviderConfig, ProviderKind, RetryConfig};
use lessonmcp_core::ConfigError;
use tracing::debug;

use crate::anthropic::AnthropicBackend;
use crate::gemini::GeminiBackend;
use crate::ollama::OllamaBackend;
use crate::openai::OpenAiBackend;
use crate::openai_compatible::OpenAiCompatibleBackend;
use crate::retry::RetryEngine;
use crate::traits::CompletionBackend;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one completion backend.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Human-readable name for logs. E.g. `"Google AI"`.
    pub display_name: &'static str,
    /// Environment variable for the API key. E.g. `"GOOGLE_API_KEY"`.
    pub env_key: &'static str,
    /// Environment variable for the base URL. E.g. `"DEEPSEEK_BASE_URL"`.
    pub env_base_url: &'static str,
    /// Default API base URL. `None` means the user must supply one.
    pub default_base_url: Option<&'static str>,
    pub requires_api_key: bool,
    /// Default model(s), in the same syntax as `<PREFIX>_MODEL`.
    pub default_model: &'static str,
    /// Per-attempt deadline when nothing is configured.
    pub default_timeout_ms: u64,
}

/// Complete list of supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        env_base_url: "OPENAI_BASE_URL",
        default_base_url: Some("https://api.openai.com/v1"),
        requires_api_key: true,
        default_model: "gpt-4",
        default_timeout_ms: 180_000,
    },
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        env_base_url: "ANTHROPIC_BASE_URL",
        default_base_url: Some("https://api.anthropic.com/v1"),
        requires_api_key: true,
        default_model: "claude-3-opus-20240229",
        default_timeout_ms: 180_000,
    },
    ProviderSpec {
        kind: ProviderKind::Google,
        display_name: "Google AI",
        env_key: "GOOGLE_API_KEY",
        env_base_url: "GOOGLE_BASE_URL",
        default_base_url: Some("https://generativelanguage.googleapis.com/v1beta"),
        requires_api_key: true,
        default_model: "gemini-pro",
        default_timeout_ms: 180_000,
    },
    // Hosted OpenAI-compatible endpoint; no canonical base URL.
    ProviderSpec {
        kind: ProviderKind::DeepSeek,
        display_name: "DeepSeek",
        env_key: "DEEPSEEK_API_KEY",
        env_base_url: "DEEPSEEK_BASE_URL",
        default_base_url: None,
        requires_api_key: true,
        default_model: "deepseek-ai/DeepSeek-R1",
        default_timeout_ms: 180_000,
    },
    ProviderSpec {
        kind: ProviderKind::Ollama,
        display_name: "Ollama",
        env_key: "OLLAMA_API_KEY",
        env_base_url: "OLLAMA_BASE_URL",
        default_base_url: Some("http://localhost:11434"),
        requires_api_key: false,
        default_model: "mistral",
        default_timeout_ms: 180_000,
    },
    // Local models are slow to load; allow a longer deadline.
    ProviderSpec {
        kind: ProviderKind::LmStudio,
        display_name: "LM Studio",
        env_key: "LM_STUDIO_API_KEY",
        env_base_url: "LM_STUDIO_BASE_URL",
        default_base_url: Some("http://localhost:1234/v1"),
        requires_api_key: false,
        default_model: "gemini-2.0-flash-exp",
        default_timeout_ms: 280_000,
    },
];

/// Find the spec for a provider kind.
pub fn find_by_kind(kind: ProviderKind) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.kind == kind)
}

/// Find a provider spec by config name (`"openai"`, `"lmstudio"`, …).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    name.parse::<ProviderKind>().ok().and_then(find_by_kind)
}

// ─────────────────────────────────────────────
// Resolved settings
// ─────────────────────────────────────────────

/// A provider's effective settings after defaults and validation.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub spec: &'static ProviderSpec,
    pub api_key: Option<String>,
    pub base_url: String,
    /// Non-empty, in priority order.
    pub models: Vec<String>,
    /// Greater than zero.
    pub timeout: Duration,
    /// Passes over the model list, at least 1.
    pub max_retries: u32,
}

impl ProviderSettings {
    /// Resolve the settings of the selected provider in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve(config.provider, config.active_provider(), &config.retry)
    }

    /// Merge user settings with the registry defaults for `kind`.
    ///
    /// Precedence: provider-specific values, then the global retry section,
    /// then the spec's defaults.
    pub fn resolve(
        kind: ProviderKind,
        provider: &ProviderConfig,
        retry: &RetryConfig,
    ) -> Result<Self, ConfigError> {
        let spec =
            find_by_kind(kind).ok_or_else(|| ConfigError::UnknownProvider(kind.to_string()))?;

        let models = provider
            .model
            .clone()
            .unwrap_or_else(|| ModelList::parse(spec.default_model));
        if models.is_empty() {
            return Err(ConfigError::NoModels {
                provider: kind.to_string(),
            });
        }

        let timeout_ms = provider
            .timeout_ms
            .or(retry.timeout_ms)
            .unwrap_or(spec.default_timeout_ms);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout {
                provider: kind.to_string(),
            });
        }

        if retry.max_retries == 0 {
            return Err(ConfigError::InvalidRetries(retry.max_retries));
        }

        let api_key = provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);
        if spec.requires_api_key && api_key.is_none() {
            return Err(ConfigError::MissingApiKey {
                provider: spec.display_name.to_string(),
                env_key: spec.env_key.to_string(),
            });
        }

        let base_url = provider
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or(spec.default_base_url)
            .map(String::from)
            .ok_or_else(|| ConfigError::MissingBaseUrl {
                provider: spec.display_name.to_string(),
                env_key: spec.env_base_url.to_string(),
            })?;

        Ok(Self {
            spec,
            api_key,
            base_url,
            models: models.into_vec(),
            timeout: Duration::from_millis(timeout_ms),
            max_retries: retry.max_retries,
        })
    }

    fn api_key_or_empty(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────

/// Build the adapter for already-validated settings.
pub fn create_backend(settings: &ProviderSettings) -> Arc<dyn CompletionBackend> {
    debug!(
        provider = settings.spec.display_name,
        base_url = %settings.base_url,
        timeout_ms = settings.timeout.as_millis() as u64,
        "Creating completion backend"
    );

    let base = settings.base_url.clone();
    let timeout = settings.timeout;
    match settings.spec.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiBackend::new(base, settings.api_key_or_empty(), timeout)),
        ProviderKind::Anthropic => {
            Arc::new(AnthropicBackend::new(base, settings.api_key_or_empty(), timeout))
        }
        ProviderKind::Google => Arc::new(GeminiBackend::new(base, settings.api_key_or_empty(), timeout)),
        ProviderKind::DeepSeek => Arc::new(OpenAiCompatibleBackend::deepseek(
            base,
            settings.api_key_or_empty(),
            timeout,
        )),
        ProviderKind::LmStudio => Arc::new(OpenAiCompatibleBackend::lm_studio(base, timeout)),
        ProviderKind::Ollama => Arc::new(OllamaBackend::new(base, timeout)),
    }
}

/// Build the retry engine for the provider selected in `config`.
///
/// This is the main entry point: resolve, validate, build the adapter, wrap
/// it in an engine. Every configuration problem surfaces here, never at call
/// time.
pub fn create_engine(config: &Config) -> Result<RetryEngine, ConfigError> {
    let settings = ProviderSettings::from_config(config)?;
    let backend = create_backend(&settings);
    RetryEngine::new(backend, settings.models, settings.max_retries)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
