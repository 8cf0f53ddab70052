//! Review ledger service
//!
//! Review submission under the one-review-per-(paper, reviewer)
//! constraint, blind redaction, and rating aggregation. Whether a query
//! returns blinded or full reviews is decided per call from the
//! caller's role, never from state held by the ledger.

use super::{PaperLifecycle, UserDirectory};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{PaperId, Review, ReviewId, Role, UserId};
use crate::store::EntityStore;
use std::sync::{Arc, RwLock};

/// Review submission, blinding, and aggregation
pub struct ReviewLedger {
    store: RwLock<EntityStore<Review>>,
    papers: Arc<PaperLifecycle>,
    users: Arc<UserDirectory>,
}

impl ReviewLedger {
    pub fn new(
        store: EntityStore<Review>,
        papers: Arc<PaperLifecycle>,
        users: Arc<UserDirectory>,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            papers,
            users,
        }
    }

    /// Ledger over a volatile store, for tests
    pub fn in_memory(papers: Arc<PaperLifecycle>, users: Arc<UserDirectory>) -> Self {
        Self::new(EntityStore::in_memory("reviews"), papers, users)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit a review for a paper
    ///
    /// The reviewer must exist and be assigned to the paper, and must
    /// not have reviewed it already. The rating is clamped to [1, 5],
    /// never rejected.
    pub fn submit_review(
        &self,
        paper_id: &PaperId,
        reviewer_id: &UserId,
        rating: i64,
        comments: &str,
    ) -> Result<Review> {
        let paper = self.papers.find_by_id(paper_id)?;
        let reviewer = self.users.find_by_id(reviewer_id)?;

        if !paper.has_reviewer(&reviewer.id) {
            return Err(AppError::ReviewerNotAssigned {
                paper_id: paper_id.to_string(),
                reviewer_id: reviewer_id.to_string(),
            });
        }

        let mut store = self.store.write().expect("review store lock poisoned");

        // one review per (paper, reviewer) pair
        let already = store
            .find_all()
            .iter()
            .any(|r| &r.paper_id == paper_id && &r.reviewer_id == reviewer_id);
        if already {
            return Err(AppError::DuplicateReview {
                paper_id: paper_id.to_string(),
                reviewer_id: reviewer_id.to_string(),
            });
        }

        let review = Review::new(
            paper_id.clone(),
            reviewer.id.clone(),
            reviewer.name.clone(),
            rating,
            comments,
        );

        if !store.save(review.clone()) {
            return Err(AppError::Duplicate {
                message: format!("review {} already exists", review.id),
            });
        }

        metrics::record_review();
        tracing::info!(
            review_id = %review.id,
            paper_id = %paper_id,
            rating = review.rating(),
            "Review submitted"
        );
        Ok(review)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Review by ID, erroring when absent
    pub fn find_by_id(&self, id: &ReviewId) -> Result<Review> {
        self.store
            .read()
            .expect("review store lock poisoned")
            .find_by_id(id.as_str())
            .ok_or_else(|| AppError::ReviewNotFound { id: id.to_string() })
    }

    /// All reviews
    pub fn all_reviews(&self) -> Vec<Review> {
        self.store
            .read()
            .expect("review store lock poisoned")
            .find_all()
    }

    /// Reviews for a paper, blinded unless the caller is an admin
    ///
    /// The caller's role is an explicit parameter: blinding never
    /// depends on hidden process-wide state.
    pub fn reviews_for_paper(&self, paper_id: &PaperId, caller_role: Role) -> Vec<Review> {
        let reviews = self
            .all_reviews()
            .into_iter()
            .filter(|r| &r.paper_id == paper_id);

        if caller_role == Role::Admin {
            reviews.collect()
        } else {
            reviews.map(|r| r.blinded()).collect()
        }
    }

    /// Reviews filed by the given reviewer
    pub fn reviews_by_reviewer(&self, reviewer_id: &UserId) -> Vec<Review> {
        self.all_reviews()
            .into_iter()
            .filter(|r| &r.reviewer_id == reviewer_id)
            .collect()
    }

    /// The review a reviewer filed for a paper, if any
    pub fn review_by_paper_and_reviewer(
        &self,
        paper_id: &PaperId,
        reviewer_id: &UserId,
    ) -> Option<Review> {
        self.all_reviews()
            .into_iter()
            .find(|r| &r.paper_id == paper_id && &r.reviewer_id == reviewer_id)
    }

    /// Reviewer IDs assigned to a paper; delegates to the lifecycle
    pub fn reviewers_for_paper(&self, paper_id: &PaperId) -> Vec<UserId> {
        self.papers.reviewers_for_paper(paper_id)
    }

    /// Arithmetic mean of a paper's ratings, 0.0 when it has none
    pub fn average_rating(&self, paper_id: &PaperId) -> f64 {
        let ratings: Vec<u8> = self
            .all_reviews()
            .iter()
            .filter(|r| &r.paper_id == paper_id)
            .map(|r| r.rating())
            .collect();

        if ratings.is_empty() {
            return 0.0;
        }

        let sum: u32 = ratings.iter().map(|&r| r as u32).sum();
        f64::from(sum) / ratings.len() as f64
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace a stored review wholesale
    pub fn update_review(&self, review: Review) -> Result<()> {
        let mut store = self.store.write().expect("review store lock poisoned");
        if store.update(review.clone()) {
            Ok(())
        } else {
            Err(AppError::ReviewNotFound {
                id: review.id.to_string(),
            })
        }
    }

    /// Delete a review
    pub fn delete_review(&self, id: &ReviewId) -> Result<()> {
        let mut store = self.store.write().expect("review store lock poisoned");
        if !store.delete_by_id(id.as_str()) {
            return Err(AppError::ReviewNotFound { id: id.to_string() });
        }
        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    struct Fixture {
        users: Arc<UserDirectory>,
        papers: Arc<PaperLifecycle>,
        ledger: ReviewLedger,
        author: User,
        reviewer: User,
        paper_id: PaperId,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(UserDirectory::in_memory());
        let papers = Arc::new(PaperLifecycle::in_memory(users.clone()));
        let ledger = ReviewLedger::in_memory(papers.clone(), users.clone());

        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let reviewer = users
            .register_faculty("Fay", "f@x.edu", "pw", "CS", "Professor", true)
            .unwrap();

        let paper = papers
            .submit_paper(
                "Graph Algorithms",
                "Shortest paths revisited.",
                "Full text.",
                &author.id,
                vec!["graphs".into()],
            )
            .unwrap();
        papers.assign_reviewer(&paper.id, &reviewer.id).unwrap();

        Fixture {
            users,
            papers,
            ledger,
            author,
            reviewer,
            paper_id: paper.id,
        }
    }

    #[test]
    fn test_submit_review_requires_assignment() {
        let f = fixture();
        let outsider = f
            .users
            .register_faculty("Out", "o@x.edu", "pw", "EE", "Lecturer", true)
            .unwrap();

        let err = f
            .ledger
            .submit_review(&f.paper_id, &outsider.id, 4, "Nice")
            .unwrap_err();
        assert!(matches!(err, AppError::ReviewerNotAssigned { .. }));
        assert!(f.ledger.all_reviews().is_empty());
    }

    #[test]
    fn test_one_review_per_pair() {
        let f = fixture();
        f.ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 4, "Solid")
            .unwrap();

        let err = f
            .ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 5, "Changed my mind")
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateReview { .. }));
        assert_eq!(f.ledger.all_reviews().len(), 1);
    }

    #[test]
    fn test_out_of_range_ratings_are_clamped() {
        let f = fixture();
        let review = f
            .ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 9, "Over")
            .unwrap();
        assert_eq!(review.rating(), 5);

        let r2 = f
            .users
            .register_faculty("F2", "f2@x.edu", "pw", "CS", "Lecturer", true)
            .unwrap();
        f.papers.assign_reviewer(&f.paper_id, &r2.id).unwrap();
        let review = f
            .ledger
            .submit_review(&f.paper_id, &r2.id, -3, "Under")
            .unwrap();
        assert_eq!(review.rating(), 1);
    }

    #[test]
    fn test_blinding_depends_on_caller_role() {
        let f = fixture();
        f.ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 4, "Solid")
            .unwrap();

        // non-admin sees redacted reviewer, full content
        let blinded = f.ledger.reviews_for_paper(&f.paper_id, Role::Student);
        assert_eq!(blinded.len(), 1);
        assert!(blinded[0].reviewer_id.is_anonymous());
        assert_eq!(blinded[0].reviewer_name, "ANONYMOUS");
        assert_eq!(blinded[0].rating(), 4);
        assert_eq!(blinded[0].comments, "Solid");

        // admin sees the reviewer
        let full = f.ledger.reviews_for_paper(&f.paper_id, Role::Admin);
        assert_eq!(full[0].reviewer_id, f.reviewer.id);
        assert_eq!(full[0].reviewer_name, "Fay");

        // the stored review is untouched by blinding
        let stored = f
            .ledger
            .review_by_paper_and_reviewer(&f.paper_id, &f.reviewer.id)
            .unwrap();
        assert_eq!(stored.reviewer_name, "Fay");
    }

    #[test]
    fn test_average_rating() {
        let f = fixture();
        assert_eq!(f.ledger.average_rating(&f.paper_id), 0.0);

        f.ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 4, "Solid")
            .unwrap();

        let r2 = f
            .users
            .register_faculty("F2", "f2@x.edu", "pw", "CS", "Lecturer", true)
            .unwrap();
        f.papers.assign_reviewer(&f.paper_id, &r2.id).unwrap();
        f.ledger
            .submit_review(&f.paper_id, &r2.id, 5, "Strong")
            .unwrap();

        assert!((f.ledger.average_rating(&f.paper_id) - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reviewers_delegate_to_lifecycle() {
        let f = fixture();
        let reviewers = f.ledger.reviewers_for_paper(&f.paper_id);
        assert_eq!(reviewers, vec![f.reviewer.id.clone()]);

        assert!(f
            .ledger
            .reviewers_for_paper(&PaperId::generate())
            .is_empty());
    }

    #[test]
    fn test_author_cannot_end_up_reviewing() {
        let f = fixture();
        // the author is never in the reviewer set, so submission fails
        let err = f
            .ledger
            .submit_review(&f.paper_id, &f.author.id, 5, "Mine is great")
            .unwrap_err();
        assert!(matches!(err, AppError::ReviewerNotAssigned { .. }));
    }

    #[test]
    fn test_update_and_delete_review() {
        let f = fixture();
        let mut review = f
            .ledger
            .submit_review(&f.paper_id, &f.reviewer.id, 4, "Solid")
            .unwrap();

        review.comments = "Solid, minor typos".to_string();
        f.ledger.update_review(review.clone()).unwrap();
        assert_eq!(
            f.ledger.find_by_id(&review.id).unwrap().comments,
            "Solid, minor typos"
        );

        f.ledger.delete_review(&review.id).unwrap();
        assert!(matches!(
            f.ledger.find_by_id(&review.id),
            Err(AppError::ReviewNotFound { .. })
        ));
    }
}
