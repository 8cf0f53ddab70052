//! Authentication utilities
//!
//! Provides:
//! - Opaque credential hashing and verification
//! - Caller identity extraction for privileged operations
//!
//! Credentials are comparison-only: the digest never leaves this module
//! and there is no token lifecycle. Privileged operations always receive
//! the caller explicitly; nothing here holds process-wide state.

use crate::errors::{AppError, Result};
use crate::models::UserId;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Header carrying the caller's user ID
pub const CALLER_HEADER: &str = "x-user-id";

/// An opaque stored credential
///
/// Wraps the SHA-256 hex digest of the user's secret. Verification is
/// the only supported operation on a stored credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Derive a credential from a plaintext secret
    pub fn from_secret(secret: &str) -> Self {
        Self(hash_secret(secret))
    }

    /// Check whether the given secret matches this credential
    pub fn matches(&self, secret: &str) -> bool {
        hash_secret(secret) == self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Hash a secret for storage
fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Caller identity extracted from the request
///
/// Handlers resolve the ID against the user directory to learn the
/// caller's role; blinding decisions are made per request from that
/// role, never from shared state.
#[derive(Debug, Clone)]
pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let id = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing or invalid X-User-ID header".to_string(),
            })?;

        Ok(CallerId(UserId::from(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_roundtrip() {
        let cred = Credential::from_secret("s3cret");
        assert!(cred.matches("s3cret"));
        assert!(!cred.matches("S3cret"));
        assert!(!cred.matches(""));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::from_secret("s3cret");
        assert_eq!(format!("{:?}", cred), "Credential(..)");
    }

    #[test]
    fn test_same_secret_same_credential() {
        assert_eq!(
            Credential::from_secret("abc"),
            Credential::from_secret("abc")
        );
        assert_ne!(
            Credential::from_secret("abc"),
            Credential::from_secret("abd")
        );
    }
}
