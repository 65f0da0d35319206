//! Runtime configuration: defaults, TOML file layer, builder overrides, validation.

mod builder;
mod loading;
mod validation;

pub use builder::ConfigBuilder;
pub(crate) use crate::core::error::Result;

use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// Pattern shared by the mail-link validator and the free-text scanner.
pub(crate) const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// Upper bound on the worker pool size accepted for a batch.
pub const MAX_CONCURRENCY: usize = 64;

/// Upper bound on URLs taken per keyword from the index.
pub const MAX_RESULTS_PER_KEYWORD: usize = 50;

pub(crate) const MAX_REDIRECTS_CAP: usize = 20;

/// Effective settings used by the harvester. Build it with [`ConfigBuilder`].
#[derive(Debug, Clone)]
pub struct Config {
    // Network
    pub request_timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub max_redirects: usize,

    // Extraction
    pub proximity_window: usize,
    pub max_name_length: usize,
    pub page_candidate_limit: usize,
    pub max_document_bytes: usize,
    pub email_regex: Regex,

    // Batch
    pub max_concurrency: usize,
    pub max_results_per_keyword: usize,

    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            user_agent: format!(
                "Mozilla/5.0 (compatible; email-harvest/{}; +contact-extraction)",
                env!("CARGO_PKG_VERSION")
            ),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            max_redirects: 5,
            proximity_window: 120,
            max_name_length: 80,
            page_candidate_limit: 10,
            max_document_bytes: 10 * 1024 * 1024,
            email_regex: Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"),
            max_concurrency: 4,
            max_results_per_keyword: 5,
            loaded_config_path: None,
        }
    }
}

/// Shape of the optional TOML configuration file. Every field is optional so a
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub network: NetworkSection,
    pub extraction: ExtractionSection,
    pub batch: BatchSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Seconds.
    pub request_timeout: Option<u64>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub max_redirects: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub proximity_window: Option<usize>,
    pub max_name_length: Option<usize>,
    pub page_candidate_limit: Option<usize>,
    pub max_document_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    pub max_concurrency: Option<usize>,
    pub max_results_per_keyword: Option<usize>,
}
