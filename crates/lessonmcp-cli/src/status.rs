//! `lessonmcp status` — show configuration and provider status.
//!
//! - Shows config path, active provider, model list, retries and timeout
//! - Shows API key / base URL status for each provider

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use lessonmcp_core::utils::{get_config_path, mask_secret};
use lessonmcp_providers::{ProviderSettings, PROVIDERS};

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = crate::helpers::load(config_path)?;
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "📚 lessonmcp Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );

    println!("  {:<18} {}", "Provider:".bold(), config.provider);

    match ProviderSettings::from_config(&config) {
        Ok(settings) => {
            println!("  {:<18} {}", "Models:".bold(), settings.models.join(", "));
            println!("  {:<18} {}", "Base URL:".bold(), settings.base_url);
            println!(
                "  {:<18} {} | timeout: {} ms",
                "Retries:".bold(),
                format!("passes: {}", settings.max_retries).dimmed(),
                settings.timeout.as_millis().to_string().dimmed(),
            );
        }
        Err(e) => {
            println!("  {:<18} {}", "Settings:".bold(), format!("✗ {e}").red());
        }
    }

    println!(
        "  {:<18} http://{}:{}/mcp",
        "HTTP:".bold(),
        config.server.host,
        config.server.port
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let provider = config.providers.get(spec.kind);
        let status = match provider.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => format!("{} (key {})", "✓".green(), mask_secret(key)),
            None if !spec.requires_api_key => format!("{}", "· no key needed".dimmed()),
            None => format!("{}", "· not configured".dimmed()),
        };
        let marker = if spec.kind == config.provider { "▶" } else { " " };
        println!("  {marker} {:<20} {}", spec.display_name, status);
    }

    println!();

    Ok(())
}
