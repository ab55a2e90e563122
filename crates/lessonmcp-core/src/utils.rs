//! Utility helpers — data directory resolution and log-friendly truncation.

use std::path::PathBuf;

/// Get the lessonmcp data directory (e.g. `~/.lessonmcp/`).
pub fn get_data_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lessonmcp")
}

/// Default config file path (`~/.lessonmcp/config.json`).
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe (prompts are mostly Hebrew).
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Redact a secret for display: keeps the first 4 characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{head}****")
}
