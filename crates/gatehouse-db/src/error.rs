//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Unique index rejected an insert/update (duplicate email, username, or secret)
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// No action token matches the presented secret and kind
    #[error("action token not found")]
    TokenInvalid,

    /// Action token exists but has expired
    #[error("action token expired")]
    TokenExpired,

    /// Action token has already been redeemed
    #[error("action token already used")]
    TokenUsed,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DbError::UniqueViolation { constraint };
            }
        }
        DbError::Sqlx(err)
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
