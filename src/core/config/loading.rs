//! Handles loading configuration from files and applying it to the Config struct.

use super::{Config, ConfigFile};
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Loads configuration settings from a TOML file.
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "File not found or is not a file: {}",
            file_path
        ));
    }
    tracing::debug!("Attempting to read config file: {}", file_path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config_file_content: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::debug!("Successfully parsed configuration file: {}", file_path);
    Ok(config_file_content)
}

/// Merges every setting present in `file_config` onto `config`.
pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    // Network
    if let Some(timeout) = file_config.network.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(ref user_agent) = file_config.network.user_agent {
        config.user_agent = user_agent.trim().to_string();
    }
    if let Some(ref accept) = file_config.network.accept {
        if !accept.trim().is_empty() {
            config.accept = accept.trim().to_string();
        }
    }
    if let Some(redirects) = file_config.network.max_redirects {
        config.max_redirects = redirects;
    }

    // Extraction
    if let Some(window) = file_config.extraction.proximity_window {
        config.proximity_window = window;
    }
    if let Some(max_len) = file_config.extraction.max_name_length {
        config.max_name_length = max_len;
    }
    if let Some(limit) = file_config.extraction.page_candidate_limit {
        config.page_candidate_limit = limit;
    }
    if let Some(bytes) = file_config.extraction.max_document_bytes {
        config.max_document_bytes = bytes;
    }

    // Batch
    if let Some(concurrency) = file_config.batch.max_concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(limit) = file_config.batch.max_results_per_keyword {
        config.max_results_per_keyword = limit;
    }
}
