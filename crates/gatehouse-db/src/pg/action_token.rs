//! PostgreSQL action token repository implementation
//!
//! Redemption is a compare-and-set UPDATE guarded by `NOT used AND
//! expires_at > NOW()`, inside the same transaction as the user-side
//! write it authorizes. Two concurrent redemptions of one secret are
//! serialized by the row lock; exactly one wins.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use gatehouse_types::TokenKind;

use crate::error::{DbError, DbResult};
use crate::models::ActionTokenRow;
use crate::repo::{ActionTokenRepository, CreateActionToken};

const TOKEN_COLUMNS: &str = "id, user_id, secret, kind, expires_at, used, created_at";

/// PostgreSQL action token repository
#[derive(Clone)]
pub struct PgActionTokenRepository {
    pool: PgPool,
}

impl PgActionTokenRepository {
    /// Create a new action token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compare-and-set: mark the token used iff it is currently
    /// redeemable. Returns `None` when the guard rejects the row.
    async fn cas_mark_used(
        tx: &mut Transaction<'_, Postgres>,
        secret: &str,
        kind: TokenKind,
    ) -> DbResult<Option<ActionTokenRow>> {
        let row = sqlx::query_as::<_, ActionTokenRow>(&format!(
            r#"
            UPDATE action_tokens
            SET used = TRUE
            WHERE secret = $1 AND kind = $2 AND NOT used AND expires_at > NOW()
            RETURNING {TOKEN_COLUMNS}
            "#,
        ))
        .bind(secret)
        .bind(kind.as_str())
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row)
    }

    /// Decide why the compare-and-set rejected a secret. Used-ness is
    /// checked before expiry so a raced double-redeem reports
    /// `TokenUsed`, not `TokenExpired`.
    async fn classify_rejection(&self, secret: &str, kind: TokenKind) -> DbError {
        let row = sqlx::query_as::<_, ActionTokenRow>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM action_tokens WHERE secret = $1 AND kind = $2",
        ))
        .bind(secret)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(Some(token)) if token.used => DbError::TokenUsed,
            Ok(Some(_)) => DbError::TokenExpired,
            Ok(None) => DbError::TokenInvalid,
            Err(e) => DbError::from(e),
        }
    }
}

#[async_trait]
impl ActionTokenRepository for PgActionTokenRepository {
    async fn issue(&self, token: CreateActionToken) -> DbResult<ActionTokenRow> {
        let row = sqlx::query_as::<_, ActionTokenRow>(&format!(
            r#"
            INSERT INTO action_tokens (id, user_id, secret, kind, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TOKEN_COLUMNS}
            "#,
        ))
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.secret)
        .bind(&token.kind)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn redeem_email_verification(&self, secret: &str) -> DbResult<ActionTokenRow> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let Some(token) = Self::cas_mark_used(&mut tx, secret, TokenKind::EmailVerification).await?
        else {
            // Rolls back the open transaction on drop.
            drop(tx);
            return Err(self.classify_rejection(secret, TokenKind::EmailVerification).await);
        };

        sqlx::query(
            "UPDATE users SET is_email_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(token.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(token)
    }

    async fn redeem_password_reset(
        &self,
        secret: &str,
        new_password_hash: &str,
    ) -> DbResult<ActionTokenRow> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let Some(token) = Self::cas_mark_used(&mut tx, secret, TokenKind::PasswordReset).await?
        else {
            drop(tx);
            return Err(self.classify_rejection(secret, TokenKind::PasswordReset).await);
        };

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(token.user_id)
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(token)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM action_tokens WHERE expires_at < NOW() OR used")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
