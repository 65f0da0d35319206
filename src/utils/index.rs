//! Local keyword index mapping search keywords to candidate page URLs.
//!
//! Two entry shapes are accepted, in JSON or CSV:
//! page entries `{url, title, keywords}` matched by substring, and keyword
//! entries `{keyword, urls}` matched exactly first, then by substring.

use crate::core::error::{AppError, Result};
use crate::core::models::BatchTask;

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Keyword {
        keyword: String,
        urls: Vec<String>,
    },
    Page {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        keywords: KeywordList,
    },
}

/// Page keywords, given either as a list or as one `;`/`,` separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeywordList {
    List(Vec<String>),
    Text(String),
}

impl Default for KeywordList {
    fn default() -> Self {
        KeywordList::List(Vec::new())
    }
}

impl KeywordList {
    fn joined(&self) -> String {
        match self {
            KeywordList::List(items) => items.join(" "),
            KeywordList::Text(text) => text.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFile {
    Entries(Vec<IndexEntry>),
    Wrapped { entries: Vec<IndexEntry> },
}

/// Read-only keyword index. Build it once, then share it by reference.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: Vec<IndexEntry>,
}

impl KeywordIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads an index file, picking the format from the extension (`.csv`,
    /// anything else is read as JSON).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let index = if is_csv {
            Self::from_csv_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };
        tracing::info!(
            "Loaded keyword index with {} entries from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: IndexFile = serde_json::from_str(content)?;
        let entries = match file {
            IndexFile::Entries(entries) | IndexFile::Wrapped { entries } => entries,
        };
        Ok(Self::new(entries))
    }

    /// Reads `url,title,keywords` rows. Only the `url` column is required;
    /// keywords within a cell are separated by `;`.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let url_column = column("url").ok_or_else(|| {
            AppError::Validation("CSV index must have a 'url' column".to_string())
        })?;
        let title_column = column("title");
        let keywords_column = column("keywords");

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let url = record.get(url_column).unwrap_or_default();
            if url.is_empty() {
                continue;
            }
            let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or_default();
            let keywords = cell(keywords_column)
                .split(';')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            entries.push(IndexEntry::Page {
                url: url.to_string(),
                title: cell(title_column).to_string(),
                keywords: KeywordList::List(keywords),
            });
        }
        Ok(Self::new(entries))
    }

    /// Up to `limit` distinct URLs for `keyword`, in index order.
    ///
    /// Keyword entries contribute an exact (case-insensitive) match, or when
    /// none exists every entry whose keyword contains the query. Page entries
    /// match when `"{url} {title} {keywords}"` contains the query.
    pub fn search(&self, keyword: &str, limit: usize) -> Vec<String> {
        let query = keyword.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let keyword_entries = || {
            self.entries.iter().filter_map(|entry| match entry {
                IndexEntry::Keyword { keyword, urls } => Some((keyword.to_lowercase(), urls)),
                IndexEntry::Page { .. } => None,
            })
        };
        let mut found: Vec<&String> = Vec::new();
        match keyword_entries().find(|(k, _)| *k == query) {
            Some((_, urls)) => found.extend(urls),
            None => keyword_entries()
                .filter(|(k, _)| k.contains(&query))
                .for_each(|(_, urls)| found.extend(urls)),
        }

        for entry in &self.entries {
            if let IndexEntry::Page { url, title, keywords } = entry {
                let haystack = format!("{} {} {}", url, title, keywords.joined()).to_lowercase();
                if haystack.contains(&query) {
                    found.push(url);
                }
            }
        }

        let mut seen = HashSet::new();
        let results: Vec<String> = found
            .into_iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty() && seen.insert(*url))
            .take(limit)
            .map(str::to_string)
            .collect();
        tracing::debug!("Index search '{}' matched {} URL(s)", keyword, results.len());
        results
    }

    /// Batch tasks for each keyword in order, `limit` URLs per keyword.
    pub fn tasks_for_keywords(&self, keywords: &[String], limit: usize) -> Vec<BatchTask> {
        keywords
            .iter()
            .flat_map(|keyword| {
                let urls = self.search(keyword, limit);
                if urls.is_empty() {
                    tracing::warn!("No indexed pages match keyword '{}'", keyword);
                }
                urls.into_iter().map(move |url| BatchTask::new(keyword.clone(), url))
            })
            .collect()
    }
}

/// Splits comma-separated keywords, trimming and dropping empties and repeats.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty() && seen.insert(k.to_string()))
        .map(str::to_string)
        .collect()
}
