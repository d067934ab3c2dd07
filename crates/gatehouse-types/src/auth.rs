//! Acting identity

use crate::role::Role;
use crate::user::UserId;

/// The authenticated caller of a protected operation.
///
/// Produced by the HTTP access gate after verifying the bearer token
/// and re-fetching the user's current role; passed explicitly into
/// service operations, never carried as ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingIdentity {
    pub user_id: UserId,
    pub role: Role,
}

impl ActingIdentity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
