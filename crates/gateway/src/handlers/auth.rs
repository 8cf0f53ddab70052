//! Registration and login handlers

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use peerforge_common::{
    auth::{CallerId, CALLER_HEADER},
    errors::{AppError, Result},
    models::{User, UserId, UserProfile},
};

/// Request to register a new user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[serde(flatten)]
    pub profile: ProfileInput,
}

/// Role-specific registration payload
#[derive(Debug, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileInput {
    Student {
        department: String,
        student_number: String,
    },
    Faculty {
        department: String,
        position: String,
        #[serde(default)]
        is_reviewer: bool,
    },
    Admin {
        admin_level: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

/// User representation returned by the API; never carries the credential
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            profile: user.profile,
        }
    }
}

/// Register a new user
///
/// Student and faculty registration is open; creating an admin requires
/// an existing admin as the caller.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let users = &state.services.users;

    let user = match request.profile {
        ProfileInput::Student {
            department,
            student_number,
        } => users.register_student(
            &request.name,
            &request.email,
            &request.password,
            &department,
            &student_number,
        )?,
        ProfileInput::Faculty {
            department,
            position,
            is_reviewer,
        } => users.register_faculty(
            &request.name,
            &request.email,
            &request.password,
            &department,
            &position,
            is_reviewer,
        )?,
        ProfileInput::Admin { admin_level } => {
            let caller_id = headers
                .get(CALLER_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::Unauthorized {
                    message: "Admin registration requires a caller identity".to_string(),
                })?;
            users.find_by_id(&UserId::from(caller_id))?.require_admin()?;

            users.register_admin(&request.name, &request.email, &request.password, &admin_level)?
        }
    };

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Authenticate by email and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.services.users.login(&request.email, &request.password)?;
    Ok(Json(user.into()))
}

/// Rotate the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    state.services.users.change_secret(
        &caller.0,
        &request.current_password,
        &request.new_password,
    )?;
    Ok(StatusCode::NO_CONTENT)
}
