//! Configuration types for the auth service

use std::time::Duration;

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session JWT signing (must be at least 32 bytes)
    pub jwt_secret: String,
    /// Session bearer token lifetime
    pub session_ttl: Duration,
    /// Email verification token lifetime
    pub verification_ttl: Duration,
    /// Password reset token lifetime
    pub reset_ttl: Duration,
    /// Public base URL embedded in verification/reset links
    pub base_url: String,
}

impl AuthConfig {
    /// Create a new auth config with default lifetimes
    ///
    /// # Errors
    /// Fails if the JWT secret is shorter than 32 bytes.
    pub fn new(
        jwt_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, crate::AuthError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < 32 {
            return Err(crate::AuthError::Configuration(
                "JWT secret must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            jwt_secret,
            session_ttl: Duration::from_secs(60 * 60),               // 1 hour
            verification_ttl: Duration::from_secs(24 * 60 * 60),     // 24 hours
            reset_ttl: Duration::from_secs(60 * 60),                 // 1 hour
            base_url: base_url.into(),
        })
    }

    /// Set the session token lifetime
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the email verification token lifetime
    pub fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification_ttl = ttl;
        self
    }

    /// Set the password reset token lifetime
    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    /// Link placed in verification emails
    pub fn verification_link(&self, secret: &str) -> String {
        format!("{}/verify-email?token={}", self.base_url, secret)
    }

    /// Link placed in password reset emails
    pub fn reset_link(&self, secret: &str) -> String {
        format!("{}/reset-password?token={}", self.base_url, secret)
    }
}
