//! User directory service
//!
//! Registration, authentication, and lookup for the three user variants.
//! Deleting a user never cascades into papers or reviews; dangling
//! references resolve to "Unknown" at display time via `display_name`.

use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{Role, User, UserId};
use crate::store::EntityStore;
use std::sync::RwLock;

/// Registration, authentication, and role lookup
pub struct UserDirectory {
    store: RwLock<EntityStore<User>>,
}

impl UserDirectory {
    pub fn new(store: EntityStore<User>) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Directory over a volatile store, for tests
    pub fn in_memory() -> Self {
        Self::new(EntityStore::in_memory("users"))
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a new student
    pub fn register_student(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        department: &str,
        student_number: &str,
    ) -> Result<User> {
        self.register(User::new_student(
            name,
            email,
            secret,
            department,
            student_number,
        ))
    }

    /// Register a new faculty member
    pub fn register_faculty(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        department: &str,
        position: &str,
        is_reviewer: bool,
    ) -> Result<User> {
        self.register(User::new_faculty(
            name,
            email,
            secret,
            department,
            position,
            is_reviewer,
        ))
    }

    /// Register a new admin
    pub fn register_admin(
        &self,
        name: &str,
        email: &str,
        secret: &str,
        admin_level: &str,
    ) -> Result<User> {
        self.register(User::new_admin(name, email, secret, admin_level))
    }

    /// Shared registration path: the email uniqueness check and the save
    /// happen under one write guard
    fn register(&self, user: User) -> Result<User> {
        let mut store = self.store.write().expect("user store lock poisoned");

        // Case-sensitive exact match, checked at registration time only
        if store.find_all().iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailTaken {
                email: user.email.clone(),
            });
        }

        if !store.save(user.clone()) {
            return Err(AppError::Duplicate {
                message: format!("user {} already exists", user.id),
            });
        }

        metrics::record_registration(user.role().as_str());
        tracing::info!(user_id = %user.id, role = %user.role(), "User registered");
        Ok(user)
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Authenticate by email and secret
    ///
    /// Unknown email and wrong secret collapse into the same error so
    /// the response does not leak which part failed.
    pub fn login(&self, email: &str, secret: &str) -> Result<User> {
        let user = self
            .find_by_email(email)
            .ok_or(AppError::InvalidCredentials)?;

        if !user.verify_secret(secret) {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Rotate a user's secret after verifying the current one
    pub fn change_secret(&self, id: &UserId, current: &str, new: &str) -> Result<()> {
        let mut store = self.store.write().expect("user store lock poisoned");

        let mut user = store
            .find_by_id(id.as_str())
            .ok_or_else(|| AppError::UserNotFound { id: id.to_string() })?;

        if !user.verify_secret(current) {
            return Err(AppError::Unauthorized {
                message: "Current password is incorrect".to_string(),
            });
        }

        user.set_secret(new);
        store.update(user);
        tracing::info!(user_id = %id, "Credential rotated");
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// First user with the given email, case-sensitive
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.store
            .read()
            .expect("user store lock poisoned")
            .find_all()
            .into_iter()
            .find(|u| u.email == email)
    }

    /// User by ID, erroring when absent
    pub fn find_by_id(&self, id: &UserId) -> Result<User> {
        self.get(id)
            .ok_or_else(|| AppError::UserNotFound { id: id.to_string() })
    }

    /// User by ID, None when absent
    pub fn get(&self, id: &UserId) -> Option<User> {
        self.store
            .read()
            .expect("user store lock poisoned")
            .find_by_id(id.as_str())
    }

    /// All users
    pub fn all_users(&self) -> Vec<User> {
        self.store
            .read()
            .expect("user store lock poisoned")
            .find_all()
    }

    /// All students
    pub fn students(&self) -> Vec<User> {
        self.by_role(Role::Student)
    }

    /// All faculty members
    pub fn faculty(&self) -> Vec<User> {
        self.by_role(Role::Faculty)
    }

    /// All admins
    pub fn admins(&self) -> Vec<User> {
        self.by_role(Role::Admin)
    }

    fn by_role(&self, role: Role) -> Vec<User> {
        self.all_users()
            .into_iter()
            .filter(|u| u.role() == role)
            .collect()
    }

    /// Whether any admin is registered
    pub fn has_admin(&self) -> bool {
        !self.admins().is_empty()
    }

    /// Name for display; dangling references resolve to "Unknown"
    pub fn display_name(&self, id: &UserId) -> String {
        self.get(id)
            .map(|u| u.name)
            .unwrap_or_else(|| crate::UNKNOWN_USER.to_string())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace a stored user wholesale
    pub fn update_user(&self, user: User) -> Result<()> {
        let mut store = self.store.write().expect("user store lock poisoned");
        if store.update(user.clone()) {
            Ok(())
        } else {
            Err(AppError::UserNotFound {
                id: user.id.to_string(),
            })
        }
    }

    /// Delete a user; admin-only, self-deletion forbidden, no cascade
    pub fn delete_user(&self, caller_id: &UserId, target_id: &UserId) -> Result<()> {
        let caller = self.find_by_id(caller_id)?;
        caller.require_admin()?;

        if caller_id == target_id {
            return Err(AppError::SelfDeletion);
        }

        let mut store = self.store.write().expect("user store lock poisoned");
        if !store.delete_by_id(target_id.as_str()) {
            return Err(AppError::UserNotFound {
                id: target_id.to_string(),
            });
        }

        tracing::info!(user_id = %target_id, deleted_by = %caller_id, "User deleted");
        Ok(())
    }
}
