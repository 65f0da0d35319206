//! # Email Harvest Core Library
//!
//! Extracts `(name, email)` contact records from web pages. A page's addresses
//! are located in mail-links and free text, each address is paired with the
//! most plausible nearby person name, and batches of pages are processed
//! concurrently with per-task failure isolation and deduplicated output.
//!
//! It is designed to be used either directly as a library or via the
//! `email-harvest` command-line tool.

mod core;
pub mod extract;
pub mod utils;

pub use crate::core::config::{Config, ConfigBuilder, ConfigFile, MAX_CONCURRENCY, MAX_RESULTS_PER_KEYWORD};
pub use crate::core::error::{AppError, Result};
pub use crate::core::fetch::{DocumentFetcher, HttpFetcher};
pub use crate::core::harvester::EmailHarvester;
pub use crate::core::models::{
    BatchProgress, BatchReport, BatchResultRow, BatchTask, CandidateRank, ContactRecord,
    EmailMatch, NameCandidate, RawDocument, SourceKind, TaskOutcome,
};
pub use crate::core::orchestrator::{validate_batch, BatchOrchestrator, BatchState, ProgressCallback};
pub use crate::utils::index::{parse_keywords, KeywordIndex};

use std::sync::Arc;

/// Builds the HTTP-backed harvester shared by every mode.
pub fn initialize_harvester(config: Arc<Config>) -> Result<EmailHarvester> {
    EmailHarvester::new(config)
}

/// Extracts contacts from a single page. Fetch and parse errors propagate.
pub async fn harvest_url(harvester: &EmailHarvester, url: &str) -> Result<Vec<ContactRecord>> {
    harvester.extract_from_url(url).await
}

/// Runs a batch with the configured concurrency and returns outcomes plus
/// deduplicated rows.
pub async fn process_tasks(
    harvester: &EmailHarvester,
    tasks: Vec<BatchTask>,
    progress: Option<ProgressCallback>,
) -> Result<BatchReport> {
    harvester.run_batch(tasks, None, progress).await
}

/// Turns comma-separated keywords into batch tasks using `index`.
///
/// Rejects an empty keyword list or a `limit` outside
/// `1..=MAX_RESULTS_PER_KEYWORD` before touching the index.
pub fn tasks_from_index(index: &KeywordIndex, raw_keywords: &str, limit: usize) -> Result<Vec<BatchTask>> {
    let keywords = parse_keywords(raw_keywords);
    if keywords.is_empty() {
        return Err(AppError::Validation(
            "Please enter at least one keyword.".to_string(),
        ));
    }
    if limit == 0 || limit > MAX_RESULTS_PER_KEYWORD {
        return Err(AppError::Validation(format!(
            "Results per keyword must be between 1 and {} (got {})",
            MAX_RESULTS_PER_KEYWORD, limit
        )));
    }
    let tasks = index.tasks_for_keywords(&keywords, limit);
    tracing::info!(
        "Built {} task(s) for {} keyword(s), up to {} per keyword.",
        tasks.len(),
        keywords.len(),
        limit
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_from_index_validation() {
        let index = KeywordIndex::from_json_str(
            r#"[{"keyword": "roofers", "urls": ["https://r.example"]}]"#,
        )
        .unwrap();
        assert!(matches!(
            tasks_from_index(&index, " , ", 5),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            tasks_from_index(&index, "roofers", 0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            tasks_from_index(&index, "roofers", 51),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            tasks_from_index(&index, "roofers, roofers", 50).unwrap(),
            vec![BatchTask::new("roofers", "https://r.example")]
        );
    }
}
