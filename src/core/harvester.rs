//! The `EmailHarvester` facade over the shared fetcher and configuration.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::fetch::{DocumentFetcher, HttpFetcher};
use crate::core::models::{BatchProgress, BatchReport, BatchTask, ContactRecord};
use crate::core::orchestrator::{BatchOrchestrator, ProgressCallback};
use crate::extract::{aggregate_batch, extract_contacts};
use crate::utils::urls::normalize_url;

use std::sync::Arc;
use std::time::Instant;

/// Entry point for contact extraction, single page or batch.
#[derive(Clone)]
pub struct EmailHarvester {
    config: Arc<Config>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl EmailHarvester {
    /// Creates a harvester backed by an HTTP fetcher.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        tracing::debug!("Initializing EmailHarvester components...");
        let fetcher = HttpFetcher::new(&config)?;
        tracing::info!("EmailHarvester initialized successfully.");
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a harvester over any fetcher, e.g. a canned one in tests.
    pub fn with_fetcher(config: Arc<Config>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches one page and extracts its contacts. Unlike batch tasks, fetch
    /// and parse errors are returned to the caller.
    pub async fn extract_from_url(&self, url: &str) -> Result<Vec<ContactRecord>> {
        let url = normalize_url(url)?.to_string();
        let task_label = url.clone();
        tracing::info!(target: "extract", "[{}] Starting extraction", task_label);
        let start_time = Instant::now();

        let raw = tokio::time::timeout(self.config.request_timeout, self.fetcher.fetch(&url))
            .await
            .map_err(|_| AppError::Fetch {
                url: url.clone(),
                reason: format!("timed out after {:?}", self.config.request_timeout),
            })??;
        let contacts = extract_contacts(&self.config, &raw)?;

        tracing::info!(
            target: "extract",
            "[{}] Found {} contact(s) in {:.2?}",
            task_label,
            contacts.len(),
            start_time.elapsed()
        );
        Ok(contacts)
    }

    /// Runs a batch with a fresh orchestrator and aggregates the rows.
    /// `concurrency` defaults to `Config::max_concurrency`.
    pub async fn run_batch(
        &self,
        tasks: Vec<BatchTask>,
        concurrency: Option<usize>,
        progress: Option<ProgressCallback>,
    ) -> Result<BatchReport> {
        let concurrency = concurrency.unwrap_or(self.config.max_concurrency);
        let orchestrator =
            BatchOrchestrator::new(Arc::clone(&self.config), Arc::clone(&self.fetcher));
        let outcomes = orchestrator.run(tasks, concurrency, progress).await?;
        let rows = aggregate_batch(&outcomes);
        let total = outcomes.len();

        tracing::info!(
            "Aggregated {} unique row(s) from {} task(s).",
            rows.len(),
            total
        );
        Ok(BatchReport {
            outcomes,
            rows,
            progress: BatchProgress { done: total, total },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::RawDocument;
    use async_trait::async_trait;

    struct SamePage(&'static str);

    #[async_trait]
    impl DocumentFetcher for SamePage {
        async fn fetch(&self, url: &str) -> Result<RawDocument> {
            Ok(RawDocument::new(url, self.0))
        }
    }

    fn harvester(body: &'static str) -> EmailHarvester {
        EmailHarvester::with_fetcher(Arc::new(Config::default()), Arc::new(SamePage(body)))
    }

    #[tokio::test]
    async fn test_extract_from_url() {
        let contacts = harvester(r#"<a href="mailto:jane@acme.com">Jane Doe</a>"#)
            .extract_from_url("acme.com/team")
            .await
            .unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_extract_from_invalid_url() {
        let result = harvester("").extract_from_url("   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_same_address_in_one_group_yields_one_row() {
        let harvester = harvester("<p>Reach a@b.com anytime</p>");
        let tasks = vec![
            BatchTask::new("plumbers", "https://one.example"),
            BatchTask::new("plumbers", "https://two.example"),
        ];
        let report = harvester.run_batch(tasks, Some(2), None).await.unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].email, "a@b.com");
        assert_eq!(report.progress, BatchProgress { done: 2, total: 2 });
    }

    #[tokio::test]
    async fn test_harvester_runs_repeated_batches() {
        let harvester = harvester("<p>a@b.com</p>");
        for _ in 0..2 {
            let report = harvester
                .run_batch(vec![BatchTask::new("g", "https://one.example")], None, None)
                .await
                .unwrap();
            assert_eq!(report.rows.len(), 1);
        }
    }
}
