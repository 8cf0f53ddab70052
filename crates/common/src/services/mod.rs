//! Workflow services
//!
//! Three services layered strictly downward: the ledger depends on the
//! lifecycle and the directory, the lifecycle depends on the directory,
//! and the directory depends on nothing above the store.

mod papers;
mod reviews;
mod users;

pub use papers::PaperLifecycle;
pub use reviews::ReviewLedger;
pub use users::UserDirectory;

use crate::config::AppConfig;
use crate::store::{EntityStore, JsonFileBackend};
use std::sync::Arc;

/// The wired service graph shared by the gateway handlers
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserDirectory>,
    pub papers: Arc<PaperLifecycle>,
    pub reviews: Arc<ReviewLedger>,
}

impl Services {
    /// Wire the services over file-backed stores from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let users = Arc::new(UserDirectory::new(EntityStore::open(
            "users",
            Box::new(JsonFileBackend::new(config.users_path())),
        )));
        let papers = Arc::new(PaperLifecycle::new(
            EntityStore::open("papers", Box::new(JsonFileBackend::new(config.papers_path()))),
            users.clone(),
        ));
        let reviews = Arc::new(ReviewLedger::new(
            EntityStore::open(
                "reviews",
                Box::new(JsonFileBackend::new(config.reviews_path())),
            ),
            papers.clone(),
            users.clone(),
        ));

        Self {
            users,
            papers,
            reviews,
        }
    }

    /// Wire the services over volatile stores, for tests
    pub fn in_memory() -> Self {
        let users = Arc::new(UserDirectory::in_memory());
        let papers = Arc::new(PaperLifecycle::in_memory(users.clone()));
        let reviews = Arc::new(ReviewLedger::in_memory(papers.clone(), users.clone()));

        Self {
            users,
            papers,
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperStatus, Role};

    /// Register, submit, assign, review, and read back blinded
    #[test]
    fn test_full_review_workflow() {
        let svc = Services::in_memory();

        let student = svc
            .users
            .register_student("Sam", "s@x.edu", "pw-s", "CS", "S-1")
            .unwrap();
        let faculty = svc
            .users
            .register_faculty("Fay", "f@x.edu", "pw-f", "CS", "Professor", true)
            .unwrap();

        // student submits
        let paper = svc
            .papers
            .submit_paper(
                "Graph Algorithms",
                "Shortest paths revisited.",
                "Full text.",
                &student.id,
                vec!["graphs".into(), "algorithms".into()],
            )
            .unwrap();
        assert_eq!(paper.status, PaperStatus::Pending);

        // admin assigns the faculty reviewer
        let assigned = svc.papers.assign_reviewer(&paper.id, &faculty.id).unwrap();
        assert_eq!(assigned.status, PaperStatus::InProgress);
        assert_eq!(assigned.reviewer_ids(), vec![faculty.id.clone()]);

        // faculty reviews
        svc.reviews
            .submit_review(&paper.id, &faculty.id, 4, "Solid")
            .unwrap();
        assert_eq!(svc.reviews.all_reviews().len(), 1);

        // the author sees a blinded review with the rating intact
        let seen = svc.reviews.reviews_for_paper(&paper.id, Role::Student);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].reviewer_name, "ANONYMOUS");
        assert!(seen[0].reviewer_id.is_anonymous());
        assert_eq!(seen[0].rating(), 4);
    }

    #[test]
    fn test_duplicate_registration_leaves_directory_unchanged() {
        let svc = Services::in_memory();

        svc.users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        assert!(svc
            .users
            .register_student("Sam Again", "s@x.edu", "pw2", "CS", "S-2")
            .is_err());
        assert_eq!(svc.users.all_users().len(), 1);
    }

    #[test]
    fn test_deleting_author_leaves_paper_with_unknown_name() {
        let svc = Services::in_memory();

        let student = svc
            .users
            .register_student("Sam", "s@x.edu", "pw", "CS", "S-1")
            .unwrap();
        let admin = svc
            .users
            .register_admin("Root", "a@x.edu", "pw", "System Admin")
            .unwrap();

        let paper = svc
            .papers
            .submit_paper("T", "A", "C", &student.id, vec![])
            .unwrap();

        svc.users.delete_user(&admin.id, &student.id).unwrap();

        // the paper survives with a dangling author reference
        let stored = svc.papers.find_by_id(&paper.id).unwrap();
        assert_eq!(stored.author_id, student.id);
        assert_eq!(svc.users.display_name(&stored.author_id), "Unknown");
    }
}
