//! PeerForge Common Library
//!
//! Shared code for the PeerForge review workflow including:
//! - Domain models (users, papers, reviews) and the blinding rules
//! - Generic entity store with file-backed persistence
//! - Workflow services (directory, lifecycle, ledger)
//! - Error types and handling
//! - Configuration management
//! - Credential hashing and caller extraction
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{Paper, PaperStatus, Review, ReviewStatus, Role, User};
pub use services::{PaperLifecycle, ReviewLedger, Services, UserDirectory};
pub use store::EntityStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sentinel identity shown in place of a blinded party
pub const ANONYMOUS: &str = "ANONYMOUS";

/// Display name used for references to deleted users
pub const UNKNOWN_USER: &str = "Unknown";
