//! Data types flowing through extraction and batch processing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Markup fetched from a URL. Owned by the extraction call that consumes it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub body: String,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Where an email address was found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// An anchor whose target uses the `mailto:` scheme.
    MailLink,
    /// A pattern match anywhere in the serialized markup.
    FreeText,
}

/// A located email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMatch {
    /// Lowercased and trimmed.
    pub email: String,
    pub source_kind: SourceKind,
    /// Byte offset into the serialized markup. Only set for `FreeText`.
    pub position: Option<usize>,
    /// Visible text of the mail-link anchor. Only set for `MailLink`.
    pub link_text: Option<String>,
}

impl EmailMatch {
    pub fn mail_link(email: impl Into<String>, link_text: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            source_kind: SourceKind::MailLink,
            position: None,
            link_text: Some(link_text.into()),
        }
    }

    pub fn free_text(email: impl Into<String>, position: usize) -> Self {
        Self {
            email: email.into(),
            source_kind: SourceKind::FreeText,
            position: Some(position),
            link_text: None,
        }
    }
}

/// Which association strategy produced a name. Lower ranks are stronger signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateRank {
    MailLinkText = 1,
    ContainingBlock = 2,
    ProximityWindow = 3,
    PageFallback = 4,
}

impl fmt::Display for CandidateRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateRank::MailLinkText => write!(f, "mail_link_text"),
            CandidateRank::ContainingBlock => write!(f, "containing_block"),
            CandidateRank::ProximityWindow => write!(f, "proximity_window"),
            CandidateRank::PageFallback => write!(f, "page_fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    pub name: String,
    pub rank: CandidateRank,
}

/// An email paired with its best-guess name. `name` is empty when no strategy matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// One unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTask {
    #[serde(alias = "keyword")]
    pub group_key: String,
    pub url: String,
}

impl BatchTask {
    pub fn new(group_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            group_key: group_key.into(),
            url: url.into(),
        }
    }
}

/// Final, batch-deduplicated output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResultRow {
    pub group_key: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total).min(100) as u8
    }
}

/// Output of one batch task. Failed tasks carry an `error` and no contacts.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub index: usize,
    pub group_key: String,
    pub url: String,
    pub contacts: Vec<ContactRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    pub(crate) fn success(index: usize, task: &BatchTask, contacts: Vec<ContactRecord>) -> Self {
        Self {
            index,
            group_key: task.group_key.clone(),
            url: task.url.clone(),
            contacts,
            error: None,
        }
    }

    pub(crate) fn failure(index: usize, task: &BatchTask, error: String) -> Self {
        Self {
            index,
            group_key: task.group_key.clone(),
            url: task.url.clone(),
            contacts: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a completed batch run produces.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<TaskOutcome>,
    pub rows: Vec<BatchResultRow>,
    pub progress: BatchProgress,
}
