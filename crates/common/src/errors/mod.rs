//! Error types for PeerForge services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Every expected failure (missing record, duplicate registration,
//! forbidden action) travels as a `Result` value with a specific reason
//! string. Persistence failures are the one category that never fails
//! the logical operation; they are logged and counted instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidCredentials,

    // Authorization errors (3xxx)
    Forbidden,
    SelfReview,
    SelfDeletion,
    ReviewerNotAssigned,

    // Resource errors (4xxx)
    UserNotFound,
    PaperNotFound,
    ReviewNotFound,

    // Conflict errors (5xxx)
    Conflict,
    EmailTaken,
    DuplicateReview,

    // Storage errors (7xxx)
    PersistenceError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1002,

            // Auth (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidCredentials => 2002,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,
            ErrorCode::SelfReview => 3002,
            ErrorCode::SelfDeletion => 3003,
            ErrorCode::ReviewerNotAssigned => 3004,

            // Resources (4xxx)
            ErrorCode::UserNotFound => 4002,
            ErrorCode::PaperNotFound => 4003,
            ErrorCode::ReviewNotFound => 4004,

            // Conflicts (5xxx)
            ErrorCode::Conflict => 5001,
            ErrorCode::EmailTaken => 5002,
            ErrorCode::DuplicateReview => 5003,

            // Storage (7xxx)
            ErrorCode::PersistenceError => 7001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Authors cannot review their own papers")]
    SelfReview,

    #[error("Users cannot delete their own account")]
    SelfDeletion,

    #[error("Reviewer {reviewer_id} is not assigned to paper {paper_id}")]
    ReviewerNotAssigned {
        paper_id: String,
        reviewer_id: String,
    },

    // Resource errors
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    #[error("Review not found: {id}")]
    ReviewNotFound { id: String },

    // Conflict errors
    #[error("Duplicate resource: {message}")]
    Duplicate { message: String },

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Reviewer {reviewer_id} has already reviewed paper {paper_id}")]
    DuplicateReview {
        paper_id: String,
        reviewer_id: String,
    },

    // Storage errors
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::SelfReview => ErrorCode::SelfReview,
            AppError::SelfDeletion => ErrorCode::SelfDeletion,
            AppError::ReviewerNotAssigned { .. } => ErrorCode::ReviewerNotAssigned,
            AppError::UserNotFound { .. } => ErrorCode::UserNotFound,
            AppError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            AppError::ReviewNotFound { .. } => ErrorCode::ReviewNotFound,
            AppError::Duplicate { .. } => ErrorCode::Conflict,
            AppError::EmailTaken { .. } => ErrorCode::EmailTaken,
            AppError::DuplicateReview { .. } => ErrorCode::DuplicateReview,
            AppError::Persistence { .. } => ErrorCode::PersistenceError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            AppError::Forbidden { .. }
            | AppError::SelfReview
            | AppError::SelfDeletion
            | AppError::ReviewerNotAssigned { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::UserNotFound { .. }
            | AppError::PaperNotFound { .. }
            | AppError::ReviewNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Duplicate { .. }
            | AppError::EmailTaken { .. }
            | AppError::DuplicateReview { .. } => StatusCode::CONFLICT,

            // 500 Internal Server Error
            AppError::Persistence { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details: None,
                request_id: None, // Should be filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
