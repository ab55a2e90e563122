//! Shared CLI helpers — startup wiring, health probe, banner.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use lessonmcp_core::config::load_config;
use lessonmcp_core::{Config, ProviderKind};
use lessonmcp_providers::{create_engine, FailureReason, RetryEngine};
use lessonmcp_tools::ToolRegistry;

use crate::rpc::RpcDispatcher;

/// Load configuration from `path` (or the default location) plus environment.
pub fn load(path: Option<&Path>) -> Result<Config> {
    load_config(path).context("failed to load configuration")
}

/// Build the retry engine for the configured provider.
pub fn build_engine(config: &Config) -> Result<Arc<RetryEngine>> {
    let engine = create_engine(config)
        .with_context(|| format!("invalid configuration for provider '{}'", config.provider))?;
    Ok(Arc::new(engine))
}

/// Engine, registry and dispatcher, ready for a transport.
pub async fn build_dispatcher(config: &Config, skip_health_check: bool) -> Result<Arc<RpcDispatcher>> {
    let engine = build_engine(config)?;
    if config.provider == ProviderKind::LmStudio && !skip_health_check {
        lm_studio_health_check(&engine).await?;
    }
    let registry = ToolRegistry::lesson_tools(engine, &config.tools);
    Ok(Arc::new(RpcDispatcher::new(Arc::new(registry))))
}

/// Send one `"test"` completion to the first model so a missing local
/// server fails at startup rather than on the first request. Any answered
/// request counts, even an empty or oddly shaped one.
pub async fn lm_studio_health_check(engine: &RetryEngine) -> Result<()> {
    let model = engine
        .models()
        .first()
        .ok_or_else(|| anyhow!("no model configured for {}", engine.backend_name()))?;

    info!(provider = engine.backend_name(), model = %model, "Running health check");
    match engine.backend().complete("test", model).await {
        Ok(_) => {}
        Err(e) if matches!(
            e.reason,
            FailureReason::MalformedResponse | FailureReason::EmptyCompletion
        ) =>
        {
            warn!(
                provider = engine.backend_name(),
                error = %e,
                "Health check reply was unusable, but the server is reachable"
            );
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)).with_context(|| {
                format!(
                    "{} health check failed for model '{model}'; is the server running? \
                     (use --skip-health-check to bypass)",
                    engine.backend_name()
                )
            });
        }
    }
    info!(provider = engine.backend_name(), "Health check passed");
    Ok(())
}

/// Startup banner, printed to stderr so stdout stays protocol-only.
pub fn print_banner(mode: &str) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!();
    eprintln!("{}  v{}", "📚 lessonmcp".cyan().bold(), version.dimmed());
    eprintln!("  Mode: {mode}");
    eprintln!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
