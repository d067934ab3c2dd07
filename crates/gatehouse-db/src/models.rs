//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use gatehouse_types::{PublicUser, Role, TokenKind, UserId};

/// User row from the database. The only type that carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row without the password hash, for list queries.
///
/// The SELECT never touches the password_hash column; the hash is
/// excluded at the query level, not stripped after the fetch.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummaryRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_email_verified: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Action token row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ActionTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret: String,
    pub kind: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Parse the stored role, defaulting to the non-privileged role on
    /// an unrecognized value
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    /// Public projection; drops the password hash
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: UserId(self.id),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role(),
            is_email_verified: self.is_email_verified,
            created_at: self.created_at,
        }
    }
}

impl UserSummaryRow {
    /// Public projection
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: UserId(self.id),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.parse().unwrap_or_default(),
            is_email_verified: self.is_email_verified,
            created_at: self.created_at,
        }
    }
}

impl ActionTokenRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Parse the stored kind, if recognized
    pub fn kind(&self) -> Option<TokenKind> {
        match self.kind.as_str() {
            "email_verification" => Some(TokenKind::EmailVerification),
            "password_reset" => Some(TokenKind::PasswordReset),
            _ => None,
        }
    }
}
