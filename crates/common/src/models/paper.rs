//! Paper entity
//!
//! Keywords and the reviewer set are private; accessors clone so callers
//! never observe or mutate the live collections. The reviewer set upholds
//! the invariant that the author is never a member.

use super::{PaperId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Paper workflow status
///
/// No state is terminal; any state is reachable by explicit admin
/// override. Assignment and removal drive the two automatic edges
/// (first reviewer -> InProgress, last reviewer removed -> Pending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperStatus {
    Pending,
    InProgress,
    Accepted,
    Rejected,
    RevisionsRequired,
    Completed,
}

impl PaperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Pending => "PENDING",
            PaperStatus::InProgress => "IN_PROGRESS",
            PaperStatus::Accepted => "ACCEPTED",
            PaperStatus::Rejected => "REJECTED",
            PaperStatus::RevisionsRequired => "REVISIONS_REQUIRED",
            PaperStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperStatus {
    type Err = String;

    /// Accepts the legacy aliases SUBMITTED (-> PENDING) and
    /// UNDER_REVIEW (-> IN_PROGRESS).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" | "SUBMITTED" => Ok(PaperStatus::Pending),
            "IN_PROGRESS" | "UNDER_REVIEW" => Ok(PaperStatus::InProgress),
            "ACCEPTED" => Ok(PaperStatus::Accepted),
            "REJECTED" => Ok(PaperStatus::Rejected),
            "REVISIONS_REQUIRED" => Ok(PaperStatus::RevisionsRequired),
            "COMPLETED" => Ok(PaperStatus::Completed),
            other => Err(format!("unknown paper status: {}", other)),
        }
    }
}

/// A submitted research paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Immutable identifier, assigned at submission
    pub id: PaperId,

    pub title: String,

    pub abstract_text: String,

    pub content: String,

    /// ID of the submitting user; dangling after that user is deleted
    pub author_id: UserId,

    /// Name snapshot taken at submission, for display
    pub author_name: String,

    pub submission_date: DateTime<Utc>,

    keywords: Vec<String>,

    reviewer_ids: Vec<UserId>,

    pub status: PaperStatus,
}

impl Paper {
    /// Create a new paper in Pending status with a fresh identifier
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        content: impl Into<String>,
        author_id: UserId,
        author_name: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            id: PaperId::generate(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            content: content.into(),
            author_id,
            author_name: author_name.into(),
            submission_date: Utc::now(),
            keywords,
            reviewer_ids: Vec::new(),
            status: PaperStatus::Pending,
        }
    }

    /// Copy of the keyword list
    pub fn keywords(&self) -> Vec<String> {
        self.keywords.clone()
    }

    pub fn set_keywords(&mut self, keywords: Vec<String>) {
        self.keywords = keywords;
    }

    /// Copy of the assigned reviewer IDs
    pub fn reviewer_ids(&self) -> Vec<UserId> {
        self.reviewer_ids.clone()
    }

    pub fn has_reviewer(&self, reviewer_id: &UserId) -> bool {
        self.reviewer_ids.contains(reviewer_id)
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviewer_ids.len()
    }

    /// Add a reviewer; the author and already-assigned reviewers are
    /// never added. Returns whether the set changed.
    pub fn assign_reviewer(&mut self, reviewer_id: UserId) -> bool {
        if reviewer_id == self.author_id || self.reviewer_ids.contains(&reviewer_id) {
            return false;
        }
        self.reviewer_ids.push(reviewer_id);
        true
    }

    /// Remove a reviewer. Returns whether the set changed.
    pub fn remove_reviewer(&mut self, reviewer_id: &UserId) -> bool {
        let before = self.reviewer_ids.len();
        self.reviewer_ids.retain(|id| id != reviewer_id);
        self.reviewer_ids.len() != before
    }

    /// Case-insensitive substring match against any keyword
    pub fn matches_keyword(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&term))
    }

    /// Ephemeral copy with the author identity redacted, shown to
    /// reviewers to keep the review double-blind. Never persisted.
    pub fn blinded(&self) -> Paper {
        Paper {
            author_id: UserId::anonymous(),
            author_name: crate::ANONYMOUS.to_string(),
            ..self.clone()
        }
    }
}

impl crate::store::Identified for Paper {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}
