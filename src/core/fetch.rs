//! Document retrieval seam. Batch processing talks to `DocumentFetcher`; the
//! HTTP implementation is the default.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::RawDocument;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{redirect, Client};
use std::sync::Arc;

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Retrieves the markup at `url`. Only transport-level problems are errors.
    async fn fetch(&self, url: &str) -> Result<RawDocument>;
}

/// Fetches pages over HTTP(S) with a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Arc<Client>,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept).map_err(|e| {
            AppError::Initialization(format!("Invalid Accept header '{}': {}", config.accept, e))
        })?;
        headers.insert(ACCEPT, accept);

        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Initialization(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "HTTP fetcher initialized (timeout {:?}, max redirects {}).",
            config.request_timeout,
            config.max_redirects
        );
        Ok(Self {
            http_client: Arc::new(http_client),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument> {
        let task_label = format!("[fetch: {}]", url);
        tracing::debug!(target: "batch_task", "{} Sending GET request", task_label);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&task_label, url, e))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(target: "batch_task", "{} Received status: {}", task_label, status);
        } else {
            tracing::warn!(
                target: "batch_task",
                "{} Received status {}; extracting from the body anyway.",
                task_label,
                status
            );
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&task_label, url, e))?;
        tracing::debug!(target: "batch_task", "{} Read {} bytes", task_label, body.len());
        Ok(RawDocument::new(url, body))
    }
}

fn transport_error(task_label: &str, url: &str, e: reqwest::Error) -> AppError {
    let reason = if e.is_timeout() {
        tracing::warn!(target: "batch_task", "{} Request timed out: {}", task_label, e);
        format!("request timed out: {}", e)
    } else if e.is_redirect() {
        tracing::warn!(target: "batch_task", "{} Too many redirects: {}", task_label, e);
        format!("redirect limit exceeded: {}", e)
    } else {
        tracing::error!(target: "batch_task", "{} Request failed: {}", task_label, e);
        e.to_string()
    };
    AppError::Fetch {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_accept_header() {
        let config = Config {
            accept: "text/html\n".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            HttpFetcher::new(&config),
            Err(AppError::Initialization(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }
}
