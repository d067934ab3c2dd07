//! Mock repositories for testing
//!
//! In-memory stores that uphold the same invariants as the real
//! database: email/username uniqueness resolved at insert time, and
//! single-use token redemption that admits exactly one winner under
//! concurrent attempts.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use gatehouse_db::{
    ActionTokenRepository, ActionTokenRow, CreateActionToken, CreateUser, DbError, DbResult,
    UserPatch, UserRepository, UserRow, UserSummaryRow,
};

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
    by_username: Arc<DashMap<String, Uuid>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_email(&self, email: &str, id: Uuid) -> DbResult<()> {
        match self.by_email.entry(email.to_string()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation {
                constraint: "users_email_key".to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    fn claim_username(&self, username: &str, id: Uuid) -> DbResult<()> {
        match self.by_username.entry(username.to_string()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation {
                constraint: "users_username_key".to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_username
            .get(username)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        // Claim the unique indices first; the entry API makes each
        // claim atomic, so concurrent duplicates lose here.
        self.claim_email(&user.email, user.id)?;
        if let Err(e) = self.claim_username(&user.username, user.id) {
            self.by_email.remove(&user.email);
            return Err(e);
        }

        let row = UserRow {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_email_verified: false,
            role: user.role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> DbResult<UserRow> {
        let current = self
            .users
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(DbError::NotFound)?;

        if let Some(ref email) = patch.email {
            if *email != current.email {
                self.claim_email(email, id)?;
                self.by_email.remove(&current.email);
            }
        }
        if let Some(ref username) = patch.username {
            if *username != current.username {
                if let Err(e) = self.claim_username(username, id) {
                    return Err(e);
                }
                self.by_username.remove(&current.username);
            }
        }

        let mut user = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(user.value().clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.by_email.remove(&user.email);
                self.by_username.remove(&user.username);
                Ok(())
            }
            None => Err(DbError::NotFound),
        }
    }

    async fn list_all(&self) -> DbResult<Vec<UserSummaryRow>> {
        Ok(self
            .users
            .iter()
            .map(|r| UserSummaryRow {
                id: r.id,
                username: r.username.clone(),
                email: r.email.clone(),
                is_email_verified: r.is_email_verified,
                role: r.role.clone(),
                created_at: r.created_at,
            })
            .collect())
    }
}

/// In-memory action token repository for testing.
///
/// Holds a handle to the user store so redemption can apply the
/// user-side effect, mirroring the real store's transactional pairing.
#[derive(Clone)]
pub struct MockActionTokenRepository {
    tokens: Arc<DashMap<Uuid, ActionTokenRow>>,
    by_secret: Arc<DashMap<String, Uuid>>,
    users: MockUserRepository,
}

impl MockActionTokenRepository {
    pub fn new(users: MockUserRepository) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            by_secret: Arc::new(DashMap::new()),
            users,
        }
    }

    /// Force a token past its expiry for testing
    pub fn expire_secret(&self, secret: &str) {
        if let Some(id) = self.by_secret.get(secret) {
            if let Some(mut token) = self.tokens.get_mut(id.value()) {
                token.expires_at = Utc::now() - chrono::Duration::seconds(1);
            }
        }
    }

    /// Mark-used compare-and-set. `get_mut` holds the entry's shard
    /// lock, so only one concurrent caller can flip `used`.
    fn cas_mark_used(&self, secret: &str, kind: &str) -> DbResult<ActionTokenRow> {
        let id = match self.by_secret.get(secret) {
            Some(id) => *id.value(),
            None => return Err(DbError::TokenInvalid),
        };

        let mut token = self.tokens.get_mut(&id).ok_or(DbError::TokenInvalid)?;
        if token.kind != kind {
            return Err(DbError::TokenInvalid);
        }
        if token.used {
            return Err(DbError::TokenUsed);
        }
        if token.expires_at <= Utc::now() {
            return Err(DbError::TokenExpired);
        }
        token.used = true;
        Ok(token.value().clone())
    }
}

#[async_trait]
impl ActionTokenRepository for MockActionTokenRepository {
    async fn issue(&self, token: CreateActionToken) -> DbResult<ActionTokenRow> {
        let row = ActionTokenRow {
            id: token.id,
            user_id: token.user_id,
            secret: token.secret.clone(),
            kind: token.kind,
            expires_at: token.expires_at,
            used: false,
            created_at: Utc::now(),
        };
        if self.by_secret.insert(token.secret, token.id).is_some() {
            return Err(DbError::UniqueViolation {
                constraint: "action_tokens_secret_key".to_string(),
            });
        }
        self.tokens.insert(row.id, row.clone());
        Ok(row)
    }

    async fn redeem_email_verification(&self, secret: &str) -> DbResult<ActionTokenRow> {
        let token = self.cas_mark_used(secret, "email_verification")?;
        if let Some(mut user) = self.users.users.get_mut(&token.user_id) {
            user.is_email_verified = true;
            user.updated_at = Utc::now();
        }
        Ok(token)
    }

    async fn redeem_password_reset(
        &self,
        secret: &str,
        new_password_hash: &str,
    ) -> DbResult<ActionTokenRow> {
        let token = self.cas_mark_used(secret, "password_reset")?;
        if let Some(mut user) = self.users.users.get_mut(&token.user_id) {
            user.password_hash = new_password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(token)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let now = Utc::now();
        let stale: Vec<Uuid> = self
            .tokens
            .iter()
            .filter(|r| r.used || r.expires_at <= now)
            .map(|r| r.id)
            .collect();
        let count = stale.len() as u64;
        for id in stale {
            if let Some((_, token)) = self.tokens.remove(&id) {
                self.by_secret.remove(&token.secret);
            }
        }
        Ok(count)
    }
}
