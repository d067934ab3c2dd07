//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Credential store: user persistence and uniqueness enforcement
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user. Duplicate email or username surfaces as
    /// `DbError::UniqueViolation` from the storage-level unique index,
    /// even when two creations race.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Apply a partial update (username, email, role). Only the
    /// provided fields change; `updated_at` is bumped by the store.
    async fn update(&self, id: Uuid, patch: UserPatch) -> DbResult<UserRow>;

    /// Delete a user. Action tokens cascade at the storage layer.
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    /// List all users, with the password hash excluded at the query level
    async fn list_all(&self) -> DbResult<Vec<UserSummaryRow>>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial user update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Action token store: single-use, typed, expiring tokens
#[async_trait]
pub trait ActionTokenRepository: Send + Sync {
    /// Persist a freshly issued token. Never invalidates older unused
    /// tokens of the same kind.
    async fn issue(&self, token: CreateActionToken) -> DbResult<ActionTokenRow>;

    /// Atomically redeem an email-verification token and mark the
    /// owning user verified. The mark-used and the user write commit
    /// together or not at all; a concurrent redemption of the same
    /// secret loses with `DbError::TokenUsed`.
    async fn redeem_email_verification(&self, secret: &str) -> DbResult<ActionTokenRow>;

    /// Atomically redeem a password-reset token and install the new
    /// password hash. Same atomicity guarantees as email verification.
    async fn redeem_password_reset(
        &self,
        secret: &str,
        new_password_hash: &str,
    ) -> DbResult<ActionTokenRow>;

    /// Delete expired or used tokens; returns how many were removed
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create action token input
#[derive(Debug, Clone)]
pub struct CreateActionToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret: String,
    pub kind: String,
    pub expires_at: DateTime<Utc>,
}
