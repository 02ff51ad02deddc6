// src/services/password_reset_service.rs

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

use crate::{
    common::error::AppError,
    db::{PasswordResetRepository, UserRepository},
    mail::templates,
    models::auth::ResetPasswordPayload,
    services::{auth::hash_password, notification_service::Notifier},
};

const TOKEN_LENGTH: usize = 64;

// A second request inside this window doesn't mail a new link
const RESEND_THROTTLE_SECONDS: i64 = 60;

/// Forgotten-password flow: mail a single-use link, then accept a new
/// password for whoever presents the token before it expires.
///
/// Neither step reveals whether an email belongs to an account.
#[derive(Clone)]
pub struct PasswordResetService {
    user_repo: UserRepository,
    reset_repo: PasswordResetRepository,
    notifier: Notifier,
    frontend_url: String,
}

impl PasswordResetService {
    pub fn new(
        user_repo: UserRepository,
        reset_repo: PasswordResetRepository,
        notifier: Notifier,
        frontend_url: String,
    ) -> Self {
        Self { user_repo, reset_repo, notifier, frontend_url }
    }

    /// Issues a token and mails the reset link. Returns the mail task when one
    /// was started; unknown emails and throttled repeats quietly get `None`.
    pub async fn request_reset(&self, email: &str) -> Result<Option<JoinHandle<()>>, AppError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::info!(email, "password reset requested for unknown email");
            return Ok(None);
        };

        if let Some(existing) = self.reset_repo.find(&user.email).await? {
            if existing.is_recent(Utc::now(), RESEND_THROTTLE_SECONDS) {
                tracing::info!(user_id = %user.id, "password reset throttled");
                return Ok(None);
            }
        }

        let token = generate_token();
        self.reset_repo.upsert(&user.email, &hash_token(&token)).await?;

        tracing::info!(user_id = %user.id, "password reset link issued");

        let url = templates::password_reset_url(&self.frontend_url, &token, &user.email);
        Ok(Some(self.notifier.password_reset(&user, &url)))
    }

    pub async fn reset(&self, payload: ResetPasswordPayload) -> Result<(), AppError> {
        let stored = self
            .reset_repo
            .find(&payload.email)
            .await?
            .ok_or_else(invalid_token)?;

        if stored.is_expired(Utc::now()) {
            self.reset_repo.delete(&stored.email).await?;
            return Err(invalid_token());
        }

        let token_hash = hash_token(&payload.token);
        if stored.token_hash != token_hash {
            return Err(invalid_token());
        }

        let user = self
            .user_repo
            .find_by_email(&stored.email)
            .await?
            .ok_or_else(invalid_token)?;

        let password_hash = hash_password(&payload.password).await?;

        // Single use, even when two resets race on the same link
        if !self.reset_repo.consume(&stored.email, &token_hash).await? {
            return Err(invalid_token());
        }
        self.user_repo.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}

fn invalid_token() -> AppError {
    AppError::field("token", "invalid", "This password reset token is invalid.")
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_random_and_alphanumeric() {
        let first = generate_token();
        let second = generate_token();
        assert_eq!(first.len(), TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn stored_hash_is_sha256_hex_of_the_token() {
        assert_eq!(
            hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
    }
}
