//! Provides the `ConfigBuilder` for fluent configuration construction.

use super::loading::{apply_file_config, load_config_file};
use super::validation::validate_config;
use super::{Config, ConfigFile, Result};
use crate::AppError;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["./email-harvest.toml", "./config.toml"];

/// Builder pattern for creating `Config` instances fluently.
///
/// Settings are layered: defaults, then the config file (explicit path or the first
/// default location found), then the overrides set on the builder. The result is
/// validated before it is returned.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    config_file_path: Option<String>,
    skip_default_locations: bool,
    overrides: ConfigFile,
    request_timeout: Option<Duration>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify a configuration file path to load. Failing to load it is an error.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    /// Do not probe `./email-harvest.toml` / `./config.toml` when no file is given.
    pub fn without_default_locations(mut self) -> Self {
        self.skip_default_locations = true;
        self
    }

    /// Overrides the request timeout with full sub-second precision. The
    /// config file setting is whole seconds.
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.overrides.network.user_agent = Some(value.into());
        self
    }
    pub fn accept(mut self, value: impl Into<String>) -> Self {
        self.overrides.network.accept = Some(value.into());
        self
    }
    pub fn max_redirects(mut self, value: usize) -> Self {
        self.overrides.network.max_redirects = Some(value);
        self
    }
    pub fn proximity_window(mut self, chars: usize) -> Self {
        self.overrides.extraction.proximity_window = Some(chars);
        self
    }
    pub fn max_name_length(mut self, chars: usize) -> Self {
        self.overrides.extraction.max_name_length = Some(chars);
        self
    }
    pub fn page_candidate_limit(mut self, value: usize) -> Self {
        self.overrides.extraction.page_candidate_limit = Some(value);
        self
    }
    pub fn max_document_bytes(mut self, value: usize) -> Self {
        self.overrides.extraction.max_document_bytes = Some(value);
        self
    }
    pub fn max_concurrency(mut self, value: usize) -> Self {
        self.overrides.batch.max_concurrency = Some(value);
        self
    }
    pub fn max_results_per_keyword(mut self, value: usize) -> Self {
        self.overrides.batch.max_results_per_keyword = Some(value);
        self
    }

    /// Builds the final `Config` object, applying defaults, file settings, overrides, and validation.
    pub fn build(mut self) -> Result<Config> {
        let mut loaded_path: Option<String> = None;

        if let Some(ref path) = self.config_file_path {
            match load_config_file(path) {
                Ok(file_config) => {
                    apply_file_config(&mut self.config, &file_config);
                    loaded_path = Some(path.clone());
                    tracing::info!("Loaded base configuration from specified file: {}", path);
                }
                Err(e) => {
                    tracing::error!("Failed to load specified config file '{}': {}", path, e);
                    return Err(AppError::Config(format!(
                        "Failed to load specified configuration file '{}': {}",
                        path, e
                    )));
                }
            }
        } else if !self.skip_default_locations {
            tracing::debug!("No config file specified, checking default locations.");
            for path_str in DEFAULT_CONFIG_LOCATIONS {
                if !Path::new(path_str).exists() {
                    continue;
                }
                match load_config_file(path_str) {
                    Ok(file_config) => {
                        apply_file_config(&mut self.config, &file_config);
                        loaded_path = Some(path_str.to_string());
                        tracing::info!(
                            "Loaded base configuration from default location: {}",
                            path_str
                        );
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load or parse default config '{}': {}",
                            path_str,
                            e
                        );
                    }
                }
            }
            if loaded_path.is_none() {
                tracing::debug!("No configuration file found. Using default values and overrides.");
            }
        }

        apply_file_config(&mut self.config, &self.overrides);
        if let Some(timeout) = self.request_timeout {
            self.config.request_timeout = timeout;
        }
        self.config.loaded_config_path = loaded_path;
        validate_config(&mut self.config)?;

        tracing::debug!("Final configuration built successfully.");
        Ok(self.config)
    }
}
