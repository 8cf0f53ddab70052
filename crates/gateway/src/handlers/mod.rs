//! API handlers module

pub mod auth;
pub mod health;
pub mod papers;
pub mod reviews;
pub mod users;

use peerforge_common::errors::Result;
use peerforge_common::models::User;

use crate::AppState;

/// Resolve the caller header into a full user record
///
/// Handlers that need the caller's role (blinding, admin checks) go
/// through here so an unknown caller fails uniformly.
pub(crate) fn resolve_caller(
    state: &AppState,
    caller: &peerforge_common::auth::CallerId,
) -> Result<User> {
    state.services.users.find_by_id(&caller.0)
}
