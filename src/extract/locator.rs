//! Finds email addresses in a document: mail-link anchors first, then a
//! free-text scan of the serialized markup.

use super::document::{element_text, Document};
use crate::core::config::{Config, EMAIL_PATTERN};
use crate::core::models::EmailMatch;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use std::collections::HashSet;

pub(crate) static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

static WHOLE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{})$", EMAIL_PATTERN)).expect("anchored email pattern is valid")
});

const MAILTO_SCHEME: &str = "mailto:";

/// Returns the normalized address of a `mailto:` href, or `None` when the href
/// uses another scheme or the address is not email-shaped.
pub(crate) fn mail_link_address(href: &str) -> Option<String> {
    let href = href.trim();
    let scheme = href.get(..MAILTO_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(MAILTO_SCHEME) {
        return None;
    }
    let address = href[MAILTO_SCHEME.len()..]
        .split('?')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    WHOLE_EMAIL.is_match(&address).then_some(address)
}

/// Locates every distinct email address in `doc`, in first-discovery order.
///
/// Mail-link matches carry the anchor's visible text; free-text matches carry
/// their byte offset into [`Document::serialized`]. An address found as a
/// mail-link is never emitted again by the free-text pass.
pub fn locate(config: &Config, doc: &Document) -> Vec<EmailMatch> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut matches = Vec::new();

    for anchor in doc.select(&LINK_SELECTOR) {
        let Some(email) = anchor.value().attr("href").and_then(mail_link_address) else {
            continue;
        };
        if seen.insert(email.clone()) {
            matches.push(EmailMatch::mail_link(email, element_text(&anchor)));
        }
    }
    let mail_links = matches.len();

    for found in config.email_regex.find_iter(doc.serialized()) {
        let email = found.as_str().trim().to_lowercase();
        if seen.insert(email.clone()) {
            matches.push(EmailMatch::free_text(email, found.start()));
        }
    }

    tracing::debug!(
        target: "extract",
        "[{}] Located {} address(es): {} mail-link, {} free-text",
        doc.url(),
        matches.len(),
        mail_links,
        matches.len() - mail_links
    );
    matches
}
