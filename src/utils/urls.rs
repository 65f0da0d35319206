//! URL normalization for task and single-page input.

use crate::core::error::{AppError, Result};
use url::Url;

/// Parses a page address into a `Url`, adding `https://` when no scheme is
/// given. Only `http` and `https` URLs with a host are accepted.
pub(crate) fn normalize_url(page_url: &str) -> Result<Url> {
    let trimmed_input = page_url.trim();
    if trimmed_input.is_empty() {
        tracing::warn!("Received empty input for URL normalization.");
        return Err(AppError::Validation("Page URL is empty".to_string()));
    }

    let url_str_with_scheme = if !trimmed_input.contains("://") {
        format!("https://{}", trimmed_input)
    } else {
        trimmed_input.to_string()
    };

    let url = Url::parse(&url_str_with_scheme).map_err(|e| {
        tracing::debug!(
            "Failed to parse normalized URL '{}' (original: '{}'): {}",
            url_str_with_scheme,
            trimmed_input,
            e
        );
        AppError::UrlParse(e)
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "Unsupported URL scheme '{}' in {}",
            url.scheme(),
            trimmed_input
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::UrlParse(url::ParseError::EmptyHost));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_valid() {
        assert_eq!(
            normalize_url("example.com").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_url("http://example.com").unwrap().as_str(),
            "http://example.com/"
        );
        assert_eq!(
            normalize_url("https://www.example.com/team?page=2")
                .unwrap()
                .as_str(),
            "https://www.example.com/team?page=2"
        );
        assert_eq!(
            normalize_url(" https://example.com ").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_url("http://127.0.0.1:8080/contact").unwrap().as_str(),
            "http://127.0.0.1:8080/contact"
        );
    }

    #[test]
    fn test_normalize_url_invalid() {
        assert!(matches!(normalize_url(""), Err(AppError::Validation(_))));
        assert!(normalize_url("   ").is_err());
        assert!(normalize_url("http://").is_err());
        assert!(normalize_url("https://").is_err());
        assert!(matches!(
            normalize_url("ftp://files.example.com"),
            Err(AppError::Validation(_))
        ));
    }
}
