//! User entity
//!
//! One struct for the fields every user shares, with a tagged
//! `UserProfile` union for the variant payloads. Role is derived from
//! the tag, never stored.

use super::UserId;
use crate::auth::Credential;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant-specific user payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserProfile {
    Student {
        department: String,
        /// Academic ID, distinct from the entity ID
        student_number: String,
    },
    Faculty {
        department: String,
        position: String,
        is_reviewer: bool,
    },
    Admin {
        admin_level: String,
    },
}

/// Derived user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Faculty => "Faculty",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Immutable identifier, assigned at registration, never reused
    pub id: UserId,

    pub name: String,

    /// Unique across all users, enforced at registration time only
    pub email: String,

    credential: Credential,

    #[serde(flatten)]
    pub profile: UserProfile,
}

impl User {
    /// Create a new student with a fresh identifier
    pub fn new_student(
        name: impl Into<String>,
        email: impl Into<String>,
        secret: &str,
        department: impl Into<String>,
        student_number: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            credential: Credential::from_secret(secret),
            profile: UserProfile::Student {
                department: department.into(),
                student_number: student_number.into(),
            },
        }
    }

    /// Create a new faculty member with a fresh identifier
    pub fn new_faculty(
        name: impl Into<String>,
        email: impl Into<String>,
        secret: &str,
        department: impl Into<String>,
        position: impl Into<String>,
        is_reviewer: bool,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            credential: Credential::from_secret(secret),
            profile: UserProfile::Faculty {
                department: department.into(),
                position: position.into(),
                is_reviewer,
            },
        }
    }

    /// Create a new admin with a fresh identifier
    pub fn new_admin(
        name: impl Into<String>,
        email: impl Into<String>,
        secret: &str,
        admin_level: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            credential: Credential::from_secret(secret),
            profile: UserProfile::Admin {
                admin_level: admin_level.into(),
            },
        }
    }

    /// Derived role, a pure function of the profile tag
    pub fn role(&self) -> Role {
        match self.profile {
            UserProfile::Student { .. } => Role::Student,
            UserProfile::Faculty { .. } => Role::Faculty,
            UserProfile::Admin { .. } => Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Fail with Forbidden unless this user is an admin
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                message: format!("{} requires the Admin role", self.role()),
            })
        }
    }

    /// Verify a plaintext secret against the stored credential
    pub fn verify_secret(&self, secret: &str) -> bool {
        self.credential.matches(secret)
    }

    /// Replace the stored credential
    pub fn set_secret(&mut self, secret: &str) {
        self.credential = Credential::from_secret(secret);
    }
}

impl crate::store::Identified for User {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}
