//! Name cleanup and the capitalized-word heuristic.

use super::document::collapse_whitespace;

use once_cell::sync::Lazy;
use regex::Regex;

/// Default cap on sanitized name length, in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 80;

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthesized pattern is valid"));

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+").expect("capitalized word pattern is valid"));

/// Capitalized words that open contact phrases ("Contact", "Email", "Dear") and
/// are never part of a person's name. They break a capitalized run.
const NON_NAME_WORDS: &[&str] = &[
    "Contact", "Email", "Mail", "Call", "Phone", "Tel", "Fax", "Write", "Reach", "Dear", "Hello",
    "Hi", "Please", "For", "Our", "The", "Send", "Questions", "Info", "Office", "Press", "Media",
    "Support", "Sales",
];

/// Sanitizes a raw name string with the default length cap.
pub fn sanitize(raw: &str) -> String {
    sanitize_with_limit(raw, DEFAULT_MAX_NAME_LENGTH)
}

/// Removes parenthesized fragments, collapses whitespace and trims. Returns an
/// empty string when either the input or the cleaned text contains `@` or is
/// longer than `max_chars`. Otherwise returns the first run of 1 to 4
/// capitalized words if there is one, else the cleaned text.
///
/// The output is a fixed point: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize_with_limit(raw: &str, max_chars: usize) -> String {
    if raw.contains('@') || raw.chars().count() > max_chars {
        return String::new();
    }
    let without_parens = PARENTHESIZED.replace_all(raw, " ");
    let cleaned = collapse_whitespace(&without_parens);
    if cleaned.contains('@') || cleaned.chars().count() > max_chars {
        return String::new();
    }
    capitalized_run(&cleaned, 1, 4).unwrap_or(cleaned)
}

/// Finds the first run of at least `min_tokens` capitalized words separated only
/// by whitespace, truncated to `max_tokens` words and joined with single spaces.
pub(crate) fn capitalized_run(text: &str, min_tokens: usize, max_tokens: usize) -> Option<String> {
    let mut run: Vec<&str> = Vec::with_capacity(max_tokens);
    let mut last_end: Option<usize> = None;

    for word in CAPITALIZED_WORD.find_iter(text) {
        let joins_run = last_end.is_some_and(|end| {
            let gap = &text[end..word.start()];
            !gap.is_empty() && gap.chars().all(char::is_whitespace)
        });
        if !joins_run {
            if run.len() >= min_tokens {
                break;
            }
            run.clear();
        }
        if NON_NAME_WORDS.contains(&word.as_str()) {
            if run.len() >= min_tokens {
                break;
            }
            run.clear();
            last_end = None;
            continue;
        }
        run.push(word.as_str());
        last_end = Some(word.end());
        if run.len() == max_tokens {
            break;
        }
    }

    (run.len() >= min_tokens && !run.is_empty()).then(|| run.join(" "))
}

/// Replaces markup tags with spaces.
pub(crate) fn strip_tags(markup: &str) -> String {
    MARKUP_TAG.replace_all(markup, " ").into_owned()
}

/// Removes every ASCII case-insensitive occurrence of `needle` (already
/// lowercase) from `haystack`.
pub(crate) fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lowered = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lowered[cursor..].find(needle) {
        let at = cursor + found;
        out.push_str(&haystack[cursor..at]);
        cursor = at + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}
