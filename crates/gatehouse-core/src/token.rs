//! Session token codec and action secret generation
//!
//! Sessions are stateless HS256 JWTs carrying only the user id and the
//! issue/expiry timestamps. Action secrets are opaque random strings;
//! their lifecycle lives in the action token store, not here.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use gatehouse_types::UserId;

use crate::AuthError;

/// Action secret size in bytes (32 bytes = 256 bits of entropy)
const ACTION_SECRET_BYTES: usize = 32;

/// Claims carried in a session bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Signs and verifies session bearer tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the server secret
    pub fn new(secret: &[u8], session_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            session_ttl,
        }
    }

    /// Issue a signed session token for a user
    pub fn issue_session(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.session_ttl)
            .map_err(|_| AuthError::Configuration("session TTL out of range".to_string()))?;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AuthError::Internal("failed to sign session token".to_string())
        })
    }

    /// Verify a session token and return the subject user id
    pub fn verify_session(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| {
                tracing::debug!("Session token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                    _ => AuthError::InvalidToken,
                }
            },
        )?;

        UserId::parse(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Generate an opaque action secret: 256 bits of OS entropy,
    /// base64 URL-safe without padding. Collisions are negligible; the
    /// store's unique index is defense-in-depth only.
    pub fn generate_action_secret() -> String {
        let mut buffer = [0u8; ACTION_SECRET_BYTES];
        OsRng.fill_bytes(&mut buffer);
        URL_SAFE_NO_PAD.encode(buffer)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec(ttl_secs: u64) -> TokenCodec {
        TokenCodec::new(SECRET, Duration::from_secs(ttl_secs))
    }

    /// Sign claims whose expiry is strictly in the past
    fn expired_token(secret: &[u8]) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: UserId::new().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn test_session_roundtrip() {
        let codec = codec(3600);
        let user_id = UserId::new();
        let token = codec.issue_session(user_id).unwrap();
        assert_eq!(codec.verify_session(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_session_rejected() {
        let codec = codec(3600);
        let result = codec.verify_session(&expired_token(SECRET));
        assert!(matches!(result, Err(AuthError::SessionExpired)));
    }

    #[test]
    fn test_tampered_session_rejected() {
        let codec = codec(3600);
        let token = codec.issue_session(UserId::new()).unwrap();

        // Flip the last character of the signature
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });

        assert!(matches!(
            codec.verify_session(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = codec(3600);
        let verifier =
            TokenCodec::new(b"another-secret-another-secret-32", Duration::from_secs(3600));

        let token = signer.issue_session(UserId::new()).unwrap();
        assert!(matches!(
            verifier.verify_session(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = codec(3600);
        for junk in ["", "nodots", "one.dot", "a.b.c.d", "!!!.@@@.###"] {
            assert!(
                matches!(codec.verify_session(junk), Err(AuthError::InvalidToken)),
                "expected rejection for {junk:?}"
            );
        }
    }

    #[test]
    fn test_action_secrets_are_distinct_and_url_safe() {
        let a = TokenCodec::generate_action_secret();
        let b = TokenCodec::generate_action_secret();
        assert_ne!(a, b);

        // 32 bytes base64-url without padding is 43 characters
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
