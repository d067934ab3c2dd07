//! Auth service - orchestrates registration, login, verification,
//! password reset, and administrative user management

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use gatehouse_db::{
    ActionTokenRepository, CreateActionToken, CreateUser, UserPatch, UserRepository,
};
use gatehouse_types::{ActingIdentity, PublicUser, Role, TokenKind, UserId};

use crate::{
    config::AuthConfig,
    mailer::Mailer,
    password::{self, MIN_PASSWORD_LENGTH},
    token::TokenCodec,
    AuthError,
};

/// Minimum accepted username length
const MIN_USERNAME_LENGTH: usize = 3;

/// Registration request
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to the non-privileged role when absent
    pub role: Option<String>,
}

/// Admin patch for a user; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct EditUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Authentication service
///
/// The per-user state machine: `Unverified` users become `Verified` by
/// redeeming an email-verification token, and only `Verified` users may
/// log in. Uniqueness and single-use invariants are owned by the
/// stores; this layer sequences the operations around them.
pub struct AuthService<U: UserRepository, T: ActionTokenRepository> {
    config: AuthConfig,
    codec: TokenCodec,
    users: Arc<U>,
    tokens: Arc<T>,
    mailer: Arc<dyn Mailer>,
}

impl<U: UserRepository, T: ActionTokenRepository> AuthService<U, T> {
    /// Create a new auth service
    pub fn new(config: AuthConfig, users: Arc<U>, tokens: Arc<T>, mailer: Arc<dyn Mailer>) -> Self {
        let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.session_ttl);
        Self {
            config,
            codec,
            users,
            tokens,
            mailer,
        }
    }

    // =========================================================================
    // Registration & login
    // =========================================================================

    /// Register a new user and dispatch a verification email.
    ///
    /// Duplicate email or username surfaces as `Conflict` from the
    /// store's unique index, including under concurrent registration.
    /// Email delivery failure does not fail the call; the user can
    /// request a fresh link later.
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser, AuthError> {
        let username = validate_username(&input.username)?;
        let email = validate_email(&input.email)?;
        validate_password(&input.password)?;
        let role = parse_role(input.role.as_deref())?;

        let password_hash = hash_blocking(input.password).await?;

        let user = self
            .users
            .create(CreateUser {
                id: Uuid::new_v4(),
                username,
                email,
                password_hash,
                role: role.as_str().to_string(),
            })
            .await?;

        let secret = self
            .issue_action_token(user.user_id(), TokenKind::EmailVerification)
            .await?;

        self.dispatch_email(
            &user.email,
            "Verify your email",
            &format!(
                "<p>Welcome, {}! Click <a href=\"{}\">here</a> to verify your email address.</p>",
                user.username,
                self.config.verification_link(&secret)
            ),
        )
        .await;

        tracing::info!(user_id = %user.user_id(), "User registered");
        Ok(user.to_public())
    }

    /// Log in with email and password; returns a session bearer token.
    ///
    /// Unknown email fails `UserNotFound`, an unverified account fails
    /// `EmailNotVerified` before the password is even compared, and a
    /// wrong password fails `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        if !verify_blocking(user.password_hash.clone(), password.to_string()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        self.codec.issue_session(user.user_id())
    }

    /// Resolve a bearer token into an acting identity.
    ///
    /// The role is re-fetched from the store rather than trusted from
    /// the token, since role can change after issuance. A token whose
    /// subject no longer exists is invalid.
    pub async fn authenticate(&self, bearer: &str) -> Result<ActingIdentity, AuthError> {
        let user_id = self.codec.verify_session(bearer)?;
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        Ok(ActingIdentity::new(user.user_id(), user.role()))
    }

    // =========================================================================
    // Email verification & password reset
    // =========================================================================

    /// Redeem an email-verification token; the mark-used and the user's
    /// verified flag commit atomically in the store.
    pub async fn verify_email(&self, secret: &str) -> Result<PublicUser, AuthError> {
        let token = self.tokens.redeem_email_verification(secret).await?;
        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        tracing::info!(user_id = %user.user_id(), "Email verified");
        Ok(user.to_public())
    }

    /// Issue a password-reset token and dispatch the reset email
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let secret = self
            .issue_action_token(user.user_id(), TokenKind::PasswordReset)
            .await?;

        self.dispatch_email(
            &user.email,
            "Reset your password",
            &format!(
                "<p>Click <a href=\"{}\">here</a> to reset your password. This link expires in one hour.</p>",
                self.config.reset_link(&secret)
            ),
        )
        .await;

        tracing::info!(user_id = %user.user_id(), "Password reset token issued");
        Ok(())
    }

    /// Redeem a password-reset token and install the new password.
    /// The mark-used and the new hash commit atomically in the store.
    pub async fn reset_password(&self, secret: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let new_hash = hash_blocking(new_password.to_string()).await?;
        let token = self.tokens.redeem_password_reset(secret, &new_hash).await?;
        tracing::info!(user_id = %token.user_id(), "Password reset");
        Ok(())
    }

    // =========================================================================
    // Profiles & user management
    // =========================================================================

    /// Fetch a profile. Callers may always read their own; reading
    /// another user requires admin.
    pub async fn get_profile(
        &self,
        identity: &ActingIdentity,
        target: Option<UserId>,
    ) -> Result<PublicUser, AuthError> {
        let target = target.unwrap_or(identity.user_id);
        if target != identity.user_id && !identity.is_admin() {
            return Err(AuthError::Forbidden(
                "cannot view another user's profile".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_id(target.0)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(user.to_public())
    }

    /// Apply an admin patch to a user; only provided fields change
    pub async fn edit_user(
        &self,
        identity: &ActingIdentity,
        target: UserId,
        input: EditUserInput,
    ) -> Result<PublicUser, AuthError> {
        require_admin(identity)?;

        let patch = UserPatch {
            username: input
                .username
                .as_deref()
                .map(validate_username)
                .transpose()?,
            email: input.email.as_deref().map(validate_email).transpose()?,
            role: match input.role.as_deref() {
                Some(r) => Some(parse_role(Some(r))?.as_str().to_string()),
                None => None,
            },
        };

        let user = self.users.update(target.0, patch).await?;
        tracing::info!(user_id = %target, actor = %identity.user_id, "User updated");
        Ok(user.to_public())
    }

    /// Delete a user; action tokens cascade at the storage layer
    pub async fn delete_user(
        &self,
        identity: &ActingIdentity,
        target: UserId,
    ) -> Result<(), AuthError> {
        require_admin(identity)?;
        self.users.delete(target.0).await?;
        tracing::info!(user_id = %target, actor = %identity.user_id, "User deleted");
        Ok(())
    }

    /// List all users; the password hash is excluded at the query level
    pub async fn list_users(
        &self,
        identity: &ActingIdentity,
    ) -> Result<Vec<PublicUser>, AuthError> {
        require_admin(identity)?;
        let rows = self.users.list_all().await?;
        Ok(rows.iter().map(|r| r.to_public()).collect())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn issue_action_token(
        &self,
        user_id: UserId,
        kind: TokenKind,
    ) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::EmailVerification => self.config.verification_ttl,
            TokenKind::PasswordReset => self.config.reset_ttl,
        };
        let ttl = ChronoDuration::from_std(ttl)
            .map_err(|_| AuthError::Configuration("token TTL out of range".to_string()))?;

        let secret = TokenCodec::generate_action_secret();
        self.tokens
            .issue(CreateActionToken {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                secret: secret.clone(),
                kind: kind.as_str().to_string(),
                expires_at: Utc::now() + ttl,
            })
            .await?;
        Ok(secret)
    }

    /// Send an email without failing the surrounding operation.
    /// Runs after all store writes have committed.
    async fn dispatch_email(&self, to: &str, subject: &str, html: &str) {
        if let Err(e) = self.mailer.send(to, subject, html).await {
            tracing::warn!(to, subject, "Email delivery failed: {}", e);
        }
    }
}

fn require_admin(identity: &ActingIdentity) -> Result<(), AuthError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("admin role required".to_string()))
    }
}

fn validate_username(username: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "username must be at least {MIN_USERNAME_LENGTH} characters"
        )));
    }
    Ok(username.to_string())
}

/// Canonical form stored in and looked up from the credential store.
/// Every path that touches an email address goes through this, so a
/// user who registered with mixed case can still log in with it.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = normalize_email(email);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AuthError::Validation("invalid email address".to_string()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn parse_role(role: Option<&str>) -> Result<Role, AuthError> {
    match role {
        None => Ok(Role::default()),
        Some(r) => r
            .parse()
            .map_err(|_| AuthError::Validation(format!("unrecognized role: {r}"))),
    }
}

/// Hash on a blocking thread; argon2 is CPU-bound and must not stall
/// the async request path.
async fn hash_blocking(plain: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_blocking(hash: String, plain: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&hash, &plain))
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
}
