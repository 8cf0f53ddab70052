//! Paper lifecycle service
//!
//! Submission, reviewer assignment, and the status machine. Reviewers
//! only ever see blinded copies; assignment upholds the self-review ban
//! and drives the two automatic status edges.

use super::UserDirectory;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{Paper, PaperId, PaperStatus, UserId};
use crate::store::EntityStore;
use std::sync::{Arc, RwLock};

/// Paper CRUD, status machine, and reviewer assignment
pub struct PaperLifecycle {
    store: RwLock<EntityStore<Paper>>,
    users: Arc<UserDirectory>,
}

impl PaperLifecycle {
    pub fn new(store: EntityStore<Paper>, users: Arc<UserDirectory>) -> Self {
        Self {
            store: RwLock::new(store),
            users,
        }
    }

    /// Lifecycle over a volatile store, for tests
    pub fn in_memory(users: Arc<UserDirectory>) -> Self {
        Self::new(EntityStore::in_memory("papers"), users)
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit a new paper for the given author
    ///
    /// The paper starts Pending and snapshots the author's current name.
    pub fn submit_paper(
        &self,
        title: &str,
        abstract_text: &str,
        content: &str,
        author_id: &UserId,
        keywords: Vec<String>,
    ) -> Result<Paper> {
        let author = self.users.find_by_id(author_id)?;

        let paper = Paper::new(
            title,
            abstract_text,
            content,
            author.id.clone(),
            author.name.clone(),
            keywords,
        );

        let mut store = self.store.write().expect("paper store lock poisoned");
        if !store.save(paper.clone()) {
            return Err(AppError::Duplicate {
                message: format!("paper {} already exists", paper.id),
            });
        }

        metrics::record_submission();
        tracing::info!(paper_id = %paper.id, author_id = %author.id, "Paper submitted");
        Ok(paper)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Paper by ID, erroring when absent
    pub fn find_by_id(&self, id: &PaperId) -> Result<Paper> {
        self.get(id)
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })
    }

    /// Paper by ID, None when absent
    pub fn get(&self, id: &PaperId) -> Option<Paper> {
        self.store
            .read()
            .expect("paper store lock poisoned")
            .find_by_id(id.as_str())
    }

    /// All papers
    pub fn all_papers(&self) -> Vec<Paper> {
        self.store
            .read()
            .expect("paper store lock poisoned")
            .find_all()
    }

    /// Papers submitted by the given author
    pub fn papers_by_author(&self, author_id: &UserId) -> Vec<Paper> {
        self.all_papers()
            .into_iter()
            .filter(|p| &p.author_id == author_id)
            .collect()
    }

    /// Papers in the given status
    pub fn papers_by_status(&self, status: PaperStatus) -> Vec<Paper> {
        self.all_papers()
            .into_iter()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Blinded copies of every paper assigned to the given reviewer
    ///
    /// The author identity is redacted so review stays double-blind.
    pub fn papers_for_reviewer(&self, reviewer_id: &UserId) -> Vec<Paper> {
        self.all_papers()
            .into_iter()
            .filter(|p| p.has_reviewer(reviewer_id))
            .map(|p| p.blinded())
            .collect()
    }

    /// Papers with any keyword containing the term, case-insensitive
    pub fn search_by_keyword(&self, term: &str) -> Vec<Paper> {
        self.all_papers()
            .into_iter()
            .filter(|p| p.matches_keyword(term))
            .collect()
    }

    /// Reviewer IDs assigned to a paper; empty when the paper is missing
    pub fn reviewers_for_paper(&self, paper_id: &PaperId) -> Vec<UserId> {
        self.get(paper_id)
            .map(|p| p.reviewer_ids())
            .unwrap_or_default()
    }

    // ========================================================================
    // Reviewer assignment
    // ========================================================================

    /// Assign a reviewer to a paper
    ///
    /// Fails when the paper or reviewer is missing or when the reviewer
    /// is the author; a self-review attempt never touches the reviewer
    /// set. Re-assigning an existing reviewer is idempotent. The status
    /// moves to InProgress unconditionally.
    pub fn assign_reviewer(&self, paper_id: &PaperId, reviewer_id: &UserId) -> Result<Paper> {
        let reviewer = self.users.find_by_id(reviewer_id)?;

        let mut store = self.store.write().expect("paper store lock poisoned");
        let mut paper = store
            .find_by_id(paper_id.as_str())
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })?;

        if paper.author_id == reviewer.id {
            return Err(AppError::SelfReview);
        }

        let added = paper.assign_reviewer(reviewer.id.clone());
        paper.status = PaperStatus::InProgress;
        store.update(paper.clone());

        if added {
            metrics::record_assignment();
            tracing::info!(
                paper_id = %paper.id,
                reviewer_id = %reviewer.id,
                "Reviewer assigned"
            );
        }
        Ok(paper)
    }

    /// Remove a reviewer from a paper
    ///
    /// When the last reviewer is removed the status reverts to Pending.
    pub fn remove_reviewer(&self, paper_id: &PaperId, reviewer_id: &UserId) -> Result<Paper> {
        let mut store = self.store.write().expect("paper store lock poisoned");
        let mut paper = store
            .find_by_id(paper_id.as_str())
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })?;

        let removed = paper.remove_reviewer(reviewer_id);
        if paper.reviewer_count() == 0 {
            paper.status = PaperStatus::Pending;
        }
        store.update(paper.clone());

        if removed {
            tracing::info!(
                paper_id = %paper.id,
                reviewer_id = %reviewer_id,
                "Reviewer removed"
            );
        }
        Ok(paper)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Explicit status override; any state is reachable from any state
    pub fn update_status(&self, paper_id: &PaperId, status: PaperStatus) -> Result<Paper> {
        let mut store = self.store.write().expect("paper store lock poisoned");
        let mut paper = store
            .find_by_id(paper_id.as_str())
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })?;

        paper.status = status;
        store.update(paper.clone());
        tracing::info!(paper_id = %paper.id, status = %status, "Paper status updated");
        Ok(paper)
    }

    /// Replace a stored paper wholesale
    pub fn update_paper(&self, paper: Paper) -> Result<()> {
        let mut store = self.store.write().expect("paper store lock poisoned");
        if store.update(paper.clone()) {
            Ok(())
        } else {
            Err(AppError::PaperNotFound {
                id: paper.id.to_string(),
            })
        }
    }

    /// Delete a paper; its reviews are left behind
    pub fn delete_paper(&self, paper_id: &PaperId) -> Result<()> {
        let mut store = self.store.write().expect("paper store lock poisoned");
        if !store.delete_by_id(paper_id.as_str()) {
            return Err(AppError::PaperNotFound {
                id: paper_id.to_string(),
            });
        }
        tracing::info!(paper_id = %paper_id, "Paper deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<UserDirectory>, PaperLifecycle) {
        let users = Arc::new(UserDirectory::in_memory());
        let papers = PaperLifecycle::in_memory(users.clone());
        (users, papers)
    }

    fn submit(papers: &PaperLifecycle, author: &UserId) -> Paper {
        papers
            .submit_paper(
                "Graph Algorithms",
                "Shortest paths revisited.",
                "Full text.",
                author,
                vec!["graphs".into()],
            )
            .unwrap()
    }

    #[test]
    fn test_submit_requires_known_author() {
        let (_users, papers) = setup();
        let err = papers
            .submit_paper("T", "A", "C", &UserId::generate(), vec![])
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound { .. }));
    }

    #[test]
    fn test_submit_snapshots_author_name() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();

        let paper = submit(&papers, &author.id);
        assert_eq!(paper.status, PaperStatus::Pending);
        assert_eq!(paper.author_name, "Sam");
    }

    #[test]
    fn test_self_assignment_fails_without_mutation() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let paper = submit(&papers, &author.id);

        let err = papers.assign_reviewer(&paper.id, &author.id).unwrap_err();
        assert!(matches!(err, AppError::SelfReview));

        let stored = papers.find_by_id(&paper.id).unwrap();
        assert_eq!(stored.reviewer_count(), 0);
        assert_eq!(stored.status, PaperStatus::Pending);
    }

    #[test]
    fn test_assignment_moves_status_and_is_idempotent() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let reviewer = users
            .register_faculty("Fay", "f@x.edu", "pw", "CS", "Professor", true)
            .unwrap();
        let paper = submit(&papers, &author.id);

        let updated = papers.assign_reviewer(&paper.id, &reviewer.id).unwrap();
        assert_eq!(updated.status, PaperStatus::InProgress);
        assert_eq!(updated.reviewer_count(), 1);

        // second assignment does not grow the set
        let again = papers.assign_reviewer(&paper.id, &reviewer.id).unwrap();
        assert_eq!(again.reviewer_count(), 1);
    }

    #[test]
    fn test_removing_all_reviewers_reverts_to_pending() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let r1 = users
            .register_faculty("F1", "f1@x.edu", "pw", "CS", "Professor", true)
            .unwrap();
        let r2 = users
            .register_faculty("F2", "f2@x.edu", "pw", "CS", "Lecturer", true)
            .unwrap();
        let paper = submit(&papers, &author.id);

        papers.assign_reviewer(&paper.id, &r1.id).unwrap();
        papers.assign_reviewer(&paper.id, &r2.id).unwrap();

        let after_one = papers.remove_reviewer(&paper.id, &r1.id).unwrap();
        assert_eq!(after_one.status, PaperStatus::InProgress);

        let after_two = papers.remove_reviewer(&paper.id, &r2.id).unwrap();
        assert_eq!(after_two.status, PaperStatus::Pending);
        assert_eq!(after_two.reviewer_count(), 0);
    }

    #[test]
    fn test_reviewer_sees_blinded_papers() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let reviewer = users
            .register_faculty("Fay", "f@x.edu", "pw", "CS", "Professor", true)
            .unwrap();
        let paper = submit(&papers, &author.id);
        papers.assign_reviewer(&paper.id, &reviewer.id).unwrap();

        let assigned = papers.papers_for_reviewer(&reviewer.id);
        assert_eq!(assigned.len(), 1);
        assert!(assigned[0].author_id.is_anonymous());
        assert_eq!(assigned[0].author_name, "ANONYMOUS");
        assert_eq!(assigned[0].title, "Graph Algorithms");
    }

    #[test]
    fn test_keyword_search() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        submit(&papers, &author.id);

        assert_eq!(papers.search_by_keyword("GRAPH").len(), 1);
        assert_eq!(papers.search_by_keyword("biology").len(), 0);
    }

    #[test]
    fn test_status_override_reaches_any_state() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let paper = submit(&papers, &author.id);

        for status in [
            PaperStatus::Accepted,
            PaperStatus::Pending,
            PaperStatus::Rejected,
            PaperStatus::RevisionsRequired,
            PaperStatus::Completed,
        ] {
            let updated = papers.update_status(&paper.id, status).unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[test]
    fn test_delete_paper() {
        let (users, papers) = setup();
        let author = users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let paper = submit(&papers, &author.id);

        papers.delete_paper(&paper.id).unwrap();
        assert!(papers.get(&paper.id).is_none());
        assert!(matches!(
            papers.delete_paper(&paper.id),
            Err(AppError::PaperNotFound { .. })
        ));
    }
}
