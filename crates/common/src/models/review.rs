//! Review entity
//!
//! Ratings are clamped to the valid range on every construction and
//! mutation, never rejected. Blinded copies redact both the reviewer ID
//! and the reviewer name.

use super::{PaperId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating
pub const MAX_RATING: u8 = 5;

/// Review status; reviews are created Completed in the current workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    InProgress,
    #[default]
    Completed,
    Rejected,
}

/// A reviewer's rated assessment of a paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Immutable identifier, assigned at submission
    pub id: ReviewId,

    pub paper_id: PaperId,

    /// Redacted to the ANONYMOUS sentinel in blinded copies
    pub reviewer_id: UserId,

    /// Name snapshot taken at submission; redacted in blinded copies
    pub reviewer_name: String,

    rating: u8,

    pub comments: String,

    pub submission_date: DateTime<Utc>,

    pub status: ReviewStatus,
}

impl Review {
    /// Create a new review with a fresh identifier; the rating is
    /// clamped to [MIN_RATING, MAX_RATING]
    pub fn new(
        paper_id: PaperId,
        reviewer_id: UserId,
        reviewer_name: impl Into<String>,
        rating: i64,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            id: ReviewId::generate(),
            paper_id,
            reviewer_id,
            reviewer_name: reviewer_name.into(),
            rating: clamp_rating(rating),
            comments: comments.into(),
            submission_date: Utc::now(),
            status: ReviewStatus::default(),
        }
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Replace the rating, clamping out-of-range values
    pub fn set_rating(&mut self, rating: i64) {
        self.rating = clamp_rating(rating);
    }

    /// Ephemeral copy with the reviewer identity redacted, shown to
    /// anyone without administrative privilege. Never persisted.
    pub fn blinded(&self) -> Review {
        Review {
            reviewer_id: UserId::anonymous(),
            reviewer_name: crate::ANONYMOUS.to_string(),
            ..self.clone()
        }
    }
}

impl crate::store::Identified for Review {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Silently normalize a rating into the valid range
fn clamp_rating(rating: i64) -> u8 {
    rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i64) -> Review {
        Review::new(
            PaperId::generate(),
            UserId::generate(),
            "Max Planck",
            rating,
            "Solid",
        )
    }

    #[test]
    fn test_rating_clamped_high() {
        assert_eq!(review(9).rating(), 5);
        assert_eq!(review(i64::MAX).rating(), 5);
    }

    #[test]
    fn test_rating_clamped_low() {
        assert_eq!(review(-3).rating(), 1);
        assert_eq!(review(0).rating(), 1);
    }

    #[test]
    fn test_rating_in_range_kept() {
        assert_eq!(review(1).rating(), 1);
        assert_eq!(review(4).rating(), 4);
        assert_eq!(review(5).rating(), 5);
    }

    #[test]
    fn test_set_rating_also_clamps() {
        let mut r = review(3);
        r.set_rating(100);
        assert_eq!(r.rating(), 5);
        r.set_rating(-100);
        assert_eq!(r.rating(), 1);
    }

    #[test]
    fn test_new_review_is_completed() {
        assert_eq!(review(4).status, ReviewStatus::Completed);
    }

    #[test]
    fn test_blinded_copy_redacts_reviewer_and_keeps_content() {
        let r = review(4);
        let blind = r.blinded();

        assert!(blind.reviewer_id.is_anonymous());
        assert_eq!(blind.reviewer_name, "ANONYMOUS");
        assert_eq!(blind.id, r.id);
        assert_eq!(blind.paper_id, r.paper_id);
        assert_eq!(blind.rating(), r.rating());
        assert_eq!(blind.comments, r.comments);
        assert_eq!(blind.submission_date, r.submission_date);
        assert_eq!(blind.status, r.status);
    }
}
