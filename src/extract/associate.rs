//! Pairs a located address with the most plausible person name.
//!
//! Strategies run strongest first and the first non-empty answer wins:
//! the mail-link's own text, the enclosing block's text, a character window
//! around a free-text match, then page-level candidates.

use super::document::{collapse_whitespace, nearest_block_text, Document};
use super::locator::{mail_link_address, LINK_SELECTOR};
use super::names::{capitalized_run, remove_ignore_ascii_case, sanitize_with_limit, strip_tags};
use crate::core::config::Config;
use crate::core::models::{CandidateRank, EmailMatch, NameCandidate, SourceKind};

pub fn associate(
    config: &Config,
    email_match: &EmailMatch,
    doc: &Document,
    page_candidates: &[String],
) -> Option<NameCandidate> {
    let max_chars = config.max_name_length;

    let candidate = from_link_text(email_match, max_chars)
        .map(|name| (name, CandidateRank::MailLinkText))
        .or_else(|| {
            from_containing_block(email_match, doc, max_chars)
                .map(|name| (name, CandidateRank::ContainingBlock))
        })
        .or_else(|| {
            from_proximity_window(email_match, doc, config.proximity_window, max_chars)
                .map(|name| (name, CandidateRank::ProximityWindow))
        })
        .or_else(|| {
            from_page_candidates(page_candidates, max_chars)
                .map(|name| (name, CandidateRank::PageFallback))
        });

    match &candidate {
        Some((name, rank)) => tracing::debug!(
            target: "extract",
            "[{}] {} -> {:?} via {}",
            doc.url(),
            email_match.email,
            name,
            rank
        ),
        None => tracing::debug!(target: "extract", "[{}] {} -> no name", doc.url(), email_match.email),
    }

    candidate.map(|(name, rank)| NameCandidate { name, rank })
}

fn non_empty(name: String) -> Option<String> {
    (!name.is_empty()).then_some(name)
}

fn from_link_text(email_match: &EmailMatch, max_chars: usize) -> Option<String> {
    let text = email_match.link_text.as_deref()?;
    non_empty(sanitize_with_limit(text, max_chars))
}

/// For a mail-link the whole block is sanitized. Free-text blocks only count
/// when they hold a 2 to 4 word capitalized run; anything else falls through to
/// the proximity window.
fn from_containing_block(email_match: &EmailMatch, doc: &Document, max_chars: usize) -> Option<String> {
    match email_match.source_kind {
        SourceKind::MailLink => {
            let block_text = doc
                .select(&LINK_SELECTOR)
                .find(|anchor| {
                    anchor
                        .value()
                        .attr("href")
                        .and_then(mail_link_address)
                        .is_some_and(|address| address == email_match.email)
                })
                .and_then(nearest_block_text)?;
            let without_address = remove_ignore_ascii_case(&block_text, &email_match.email);
            non_empty(sanitize_with_limit(&without_address, max_chars))
        }
        SourceKind::FreeText => {
            let block_text = doc
                .element_with_text(&email_match.email)
                .and_then(nearest_block_text)?;
            let without_address = remove_ignore_ascii_case(&block_text, &email_match.email);
            if without_address.chars().count() > max_chars {
                return None;
            }
            let run = capitalized_run(&without_address, 2, 4)?;
            non_empty(sanitize_with_limit(&run, max_chars))
        }
    }
}

fn from_proximity_window(
    email_match: &EmailMatch,
    doc: &Document,
    window: usize,
    max_chars: usize,
) -> Option<String> {
    if email_match.source_kind != SourceKind::FreeText {
        return None;
    }
    let markup = doc.serialized();
    let start = email_match.position?;
    let end = start + email_match.email.len();
    if end > markup.len() || !markup.is_char_boundary(start) || !markup.is_char_boundary(end) {
        return None;
    }

    let window_start = markup[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(start, |(offset, _)| offset);
    let window_end = markup[end..]
        .char_indices()
        .nth(window)
        .map_or(markup.len(), |(offset, _)| end + offset);

    let text = collapse_whitespace(&strip_tags(&markup[window_start..window_end]));
    let text = remove_ignore_ascii_case(&text, &email_match.email);
    let run = capitalized_run(&text, 2, 4)?;
    non_empty(sanitize_with_limit(&run, max_chars))
}

fn from_page_candidates(page_candidates: &[String], max_chars: usize) -> Option<String> {
    page_candidates
        .iter()
        .filter_map(|candidate| capitalized_run(candidate, 2, 4))
        .find_map(|run| non_empty(sanitize_with_limit(&run, max_chars)))
}
