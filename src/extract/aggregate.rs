//! Builds contact records for a document and deduplicated rows for a batch.

use super::associate::associate;
use super::document::Document;
use super::locator::locate;
use super::page::extract_page_candidates;
use crate::core::config::Config;
use crate::core::models::{BatchResultRow, ContactRecord, TaskOutcome};

use std::collections::HashSet;

/// One record per distinct address, in locator order. The name is empty when
/// no strategy produced one.
pub fn aggregate_document(config: &Config, doc: &Document) -> Vec<ContactRecord> {
    let matches = locate(config, doc);
    if matches.is_empty() {
        return Vec::new();
    }
    let page_candidates = extract_page_candidates(doc, config.page_candidate_limit);

    matches
        .iter()
        .map(|email_match| ContactRecord {
            email: email_match.email.clone(),
            name: associate(config, email_match, doc, &page_candidates)
                .map(|candidate| candidate.name)
                .unwrap_or_default(),
        })
        .collect()
}

/// Flattens task outcomes into rows, walking tasks in their original order.
/// The first `(group_key, email)` pair wins; later repeats are dropped without
/// merging names.
pub fn aggregate_batch(outcomes: &[TaskOutcome]) -> Vec<BatchResultRow> {
    let mut ordered: Vec<&TaskOutcome> = outcomes.iter().collect();
    ordered.sort_by_key(|outcome| outcome.index);

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut rows = Vec::new();
    for outcome in ordered {
        for contact in &outcome.contacts {
            if seen.insert((outcome.group_key.as_str(), contact.email.as_str())) {
                rows.push(BatchResultRow {
                    group_key: outcome.group_key.clone(),
                    email: contact.email.clone(),
                    name: contact.name.clone(),
                });
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BatchTask;

    fn record(email: &str, name: &str) -> ContactRecord {
        ContactRecord {
            email: email.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_document_scenarios() {
        let config = Config::default();
        let doc = Document::from_markup(r#"<a href="mailto:jane@acme.com">Jane Doe</a>"#);
        assert_eq!(aggregate_document(&config, &doc), vec![record("jane@acme.com", "Jane Doe")]);

        let doc =
            Document::from_markup("<p>Contact John Smith at john@example.org for details.</p>");
        assert_eq!(
            aggregate_document(&config, &doc),
            vec![record("john@example.org", "John Smith")]
        );
    }

    #[test]
    fn test_document_unique_by_email() {
        let config = Config::default();
        let doc = Document::from_markup(
            r#"<title>Acme Dental Group</title>
               <p><a href="mailto:info@acme.com">Front Desk</a></p>
               <p>Also INFO@ACME.COM and billing@acme.com</p>"#,
        );
        let records = aggregate_document(&config, &doc);
        let emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["info@acme.com", "billing@acme.com"]);
        assert_eq!(records[0].name, "Front Desk");
    }

    #[test]
    fn test_document_without_addresses() {
        let doc = Document::from_markup("<h1>Jane Doe</h1>");
        assert!(aggregate_document(&Config::default(), &doc).is_empty());
    }

    #[test]
    fn test_batch_dedup_within_group() {
        let first = TaskOutcome::success(
            0,
            &BatchTask::new("dentists", "https://a.example"),
            vec![record("a@b.com", "Ann Lee")],
        );
        let second = TaskOutcome::success(
            1,
            &BatchTask::new("dentists", "https://b.example"),
            vec![record("a@b.com", "")],
        );
        let rows = aggregate_batch(&[first, second]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ann Lee");
    }

    #[test]
    fn test_batch_keeps_pairs_across_groups_in_task_order() {
        let outcomes = vec![
            TaskOutcome::success(
                2,
                &BatchTask::new("vets", "https://c.example"),
                vec![record("a@b.com", "Late")],
            ),
            TaskOutcome::failure(
                1,
                &BatchTask::new("vets", "https://x.example"),
                "timed out".into(),
            ),
            TaskOutcome::success(
                0,
                &BatchTask::new("dentists", "https://a.example"),
                vec![record("a@b.com", "Early"), record("c@d.com", "")],
            ),
        ];
        let rows = aggregate_batch(&outcomes);
        let pairs: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.group_key.as_str(), r.email.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("dentists", "a@b.com", "Early"),
                ("dentists", "c@d.com", ""),
                ("vets", "a@b.com", "Late"),
            ]
        );
    }
}
