//! Page-level name candidates used when nothing near an address looks like a name.

use super::document::{collapse_whitespace, element_text, Document};

use once_cell::sync::Lazy;
use scraper::Selector;
use std::collections::HashSet;

static AUTHOR_META: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="author"]"#).expect("author selector is valid"));
static SITE_NAME_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:site_name"]"#).expect("site name selector is valid")
});
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("title selector is valid"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector is valid"));
static SHORT_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, h2, h3").expect("short text selector is valid"));

/// Collects candidate strings in priority order: author meta, site name meta,
/// title, first heading, then up to `short_text_limit` paragraph/subheading
/// texts. Empty strings are skipped and repeats collapse to the first one.
pub fn extract_page_candidates(doc: &Document, short_text_limit: usize) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    let meta_content = |selector: &Selector| {
        doc.select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(collapse_whitespace)
    };
    let first_text = |selector: &Selector| doc.select(selector).next().map(|el| element_text(&el));

    let leading = [
        meta_content(&*AUTHOR_META),
        meta_content(&*SITE_NAME_META),
        first_text(&*TITLE),
        first_text(&*HEADING),
    ];
    for candidate in leading.into_iter().flatten() {
        push_candidate(&mut candidates, &mut seen, candidate);
    }
    for element in doc.select(&SHORT_TEXT).take(short_text_limit) {
        push_candidate(&mut candidates, &mut seen, element_text(&element));
    }

    tracing::trace!(target: "extract", "[{}] Page candidates: {:?}", doc.url(), candidates);
    candidates
}

fn push_candidate(candidates: &mut Vec<String>, seen: &mut HashSet<String>, candidate: String) {
    if !candidate.is_empty() && seen.insert(candidate.clone()) {
        candidates.push(candidate);
    }
}
