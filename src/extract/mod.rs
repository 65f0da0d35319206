//! Synchronous contact extraction: locate addresses, associate names, aggregate.

pub mod aggregate;
pub mod associate;
pub mod document;
pub mod locator;
pub mod names;
pub mod page;

pub use aggregate::{aggregate_batch, aggregate_document};
pub use document::Document;
pub use names::sanitize;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{ContactRecord, RawDocument};

/// Parses `raw` and returns its contact records.
///
/// Fails only with `AppError::Parse` when the document exceeds
/// `config.max_document_bytes`.
pub fn extract_contacts(config: &Config, raw: &RawDocument) -> Result<Vec<ContactRecord>> {
    let doc = Document::parse(raw, config.max_document_bytes)?;
    let contacts = aggregate_document(config, &doc);
    tracing::debug!(
        target: "extract",
        "[{}] Extracted {} contact(s), {} named",
        raw.url,
        contacts.len(),
        contacts.iter().filter(|c| !c.name.is_empty()).count()
    );
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;

    #[test]
    fn test_extract_contacts_from_raw_markup() {
        let raw = RawDocument::new(
            "https://acme.example/team",
            r#"<html><body>
                 <section><h2>Team</h2>
                   <ul>
                     <li><a href="mailto:jane@acme.com?subject=Hello">Jane Doe</a></li>
                     <li>Ravi Patel (Sales Lead): ravi@acme.com</li>
                   </ul>
                 </section>
               </body></html>"#,
        );
        let contacts = extract_contacts(&Config::default(), &raw).unwrap();
        assert_eq!(
            contacts,
            vec![
                ContactRecord {
                    email: "jane@acme.com".into(),
                    name: "Jane Doe".into()
                },
                ContactRecord {
                    email: "ravi@acme.com".into(),
                    name: "Ravi Patel".into()
                },
            ]
        );
    }

    #[test]
    fn test_extract_contacts_size_limit() {
        let config = Config {
            max_document_bytes: 16,
            ..Config::default()
        };
        let raw = RawDocument::new("https://big.example", "<p>a@b.com</p>".repeat(4));
        assert!(matches!(
            extract_contacts(&config, &raw),
            Err(AppError::Parse { .. })
        ));
    }
}
