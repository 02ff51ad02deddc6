// src/db/password_reset_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::auth::PasswordResetToken};

#[derive(Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, email: &str) -> Result<Option<PasswordResetToken>, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT email, token_hash, created_at FROM password_reset_tokens WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    /// Replaces any earlier token for this email and restarts its clock.
    pub async fn upsert(&self, email: &str, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (email, token_hash, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (email) DO UPDATE
             SET token_hash = EXCLUDED.token_hash, created_at = EXCLUDED.created_at",
        )
        .bind(email)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the token only if it is still the one the caller checked.
    /// `false` means another request consumed or replaced it first.
    pub async fn consume(&self, email: &str, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE email = $1 AND token_hash = $2")
            .bind(email)
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
