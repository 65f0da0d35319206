//! Contains validation logic for the final Config struct.

use super::{Config, Result, MAX_CONCURRENCY, MAX_REDIRECTS_CAP, MAX_RESULTS_PER_KEYWORD};
use crate::core::error::AppError;

/// Validates the configuration after loading and overrides.
/// Clamps values where a sensible correction exists, rejects the rest.
pub(crate) fn validate_config(config: &mut Config) -> Result<()> {
    if config.max_concurrency == 0 {
        tracing::warn!("Max concurrency was set to 0. Setting to 1.");
        config.max_concurrency = 1;
    }
    if config.max_concurrency > MAX_CONCURRENCY {
        return Err(AppError::Config(format!(
            "Max concurrency {} exceeds the limit of {}",
            config.max_concurrency, MAX_CONCURRENCY
        )));
    }
    if config.request_timeout.is_zero() {
        return Err(AppError::Config(
            "Request timeout must be greater than zero.".to_string(),
        ));
    }
    if config.user_agent.trim().is_empty() {
        return Err(AppError::Config("User agent cannot be empty.".to_string()));
    }
    if config.max_redirects > MAX_REDIRECTS_CAP {
        tracing::warn!(
            "Max redirects ({}) > {}. Clamping.",
            config.max_redirects,
            MAX_REDIRECTS_CAP
        );
        config.max_redirects = MAX_REDIRECTS_CAP;
    }
    if config.proximity_window == 0 {
        return Err(AppError::Config(
            "Proximity window must be greater than zero.".to_string(),
        ));
    }
    if config.max_name_length == 0 {
        return Err(AppError::Config(
            "Max name length must be greater than zero.".to_string(),
        ));
    }
    if config.max_document_bytes == 0 {
        return Err(AppError::Config(
            "Max document size must be greater than zero.".to_string(),
        ));
    }
    if config.max_results_per_keyword == 0 || config.max_results_per_keyword > MAX_RESULTS_PER_KEYWORD
    {
        return Err(AppError::Config(format!(
            "Max results per keyword must be between 1 and {} (got {})",
            MAX_RESULTS_PER_KEYWORD, config.max_results_per_keyword
        )));
    }
    Ok(())
}
