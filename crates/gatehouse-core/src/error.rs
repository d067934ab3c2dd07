//! Auth errors

use thiserror::Error;

/// Authentication and user-management errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or missing input
    #[error("validation failed: {0}")]
    Validation(String),

    /// Email or username already taken
    #[error("conflict: {0}")]
    Conflict(String),

    /// Wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token malformed or signature invalid
    #[error("invalid token")]
    InvalidToken,

    /// Bearer token expired
    #[error("session expired")]
    SessionExpired,

    /// Login attempted before email verification
    #[error("email not verified")]
    EmailNotVerified,

    /// Authenticated but insufficient privilege
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// No action token matches the presented secret
    #[error("token is invalid")]
    TokenInvalid,

    /// Action token expired
    #[error("token has expired")]
    TokenExpired,

    /// Action token already redeemed
    #[error("token already used")]
    TokenUsed,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::TokenUsed => 400,
            Self::InvalidCredentials | Self::InvalidToken | Self::SessionExpired => 401,
            Self::EmailNotVerified | Self::Forbidden(_) => 403,
            Self::UserNotFound => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenUsed => "TOKEN_USED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<gatehouse_db::DbError> for AuthError {
    fn from(err: gatehouse_db::DbError) -> Self {
        use gatehouse_db::DbError;
        match err {
            DbError::NotFound => Self::UserNotFound,
            DbError::UniqueViolation { constraint } => {
                Self::Conflict(conflict_message(&constraint))
            }
            DbError::TokenInvalid => Self::TokenInvalid,
            DbError::TokenExpired => Self::TokenExpired,
            DbError::TokenUsed => Self::TokenUsed,
            DbError::Sqlx(e) => {
                tracing::error!("Database error: {}", e);
                Self::Database(e.to_string())
            }
        }
    }
}

/// Map a unique-index name to a caller-facing conflict message
fn conflict_message(constraint: &str) -> String {
    if constraint.contains("email") {
        "email already in use".to_string()
    } else if constraint.contains("username") {
        "username already taken".to_string()
    } else {
        "resource already exists".to_string()
    }
}
