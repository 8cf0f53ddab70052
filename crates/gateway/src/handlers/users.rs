//! User directory handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{auth::UserResponse, resolve_caller};
use crate::AppState;
use peerforge_common::{
    auth::CallerId,
    errors::Result,
    models::{Role, UserId},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Restrict to one role
    pub role: Option<Role>,
}

/// List users, optionally filtered by role; admin-only
pub async fn list_users(
    State(state): State<AppState>,
    caller: CallerId,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>> {
    resolve_caller(&state, &caller)?.require_admin()?;

    let users = &state.services.users;

    let listed = match query.role {
        Some(Role::Student) => users.students(),
        Some(Role::Faculty) => users.faculty(),
        Some(Role::Admin) => users.admins(),
        None => users.all_users(),
    };

    Ok(Json(listed.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state.services.users.find_by_id(&UserId::from(user_id))?;
    Ok(Json(user.into()))
}

/// Delete a user; admin-only, self-deletion forbidden
///
/// Papers and reviews referencing the user are left in place.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: CallerId,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    state
        .services
        .users
        .delete_user(&caller.0, &UserId::from(user_id))?;
    Ok(StatusCode::NO_CONTENT)
}
