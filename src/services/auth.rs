// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, RegisterCustomerPayload, Role, SessionScope, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_ttl_hours: i64,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, jwt_ttl_hours: i64) -> Self {
        Self { user_repo, jwt_secret, jwt_ttl_hours }
    }

    /// Back-office login. Customers are refused even with a correct password.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        self.login(email, password, SessionScope::Admin).await
    }

    /// Storefront login. Staff accounts are refused even with a correct password.
    pub async fn customer_login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        self.login(email, password, SessionScope::Customer).await
    }

    pub async fn register_customer(&self, payload: RegisterCustomerPayload) -> Result<AuthResponse, AppError> {
        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&payload.password).await?;

        // The unique constraint still guards a concurrent registration
        let user = self
            .user_repo
            .create(&payload.name, &payload.email, &password_hash, Role::Customer)
            .await?;

        tracing::info!(user_id = %user.id, "customer registered");

        let token = self.create_token(&user, SessionScope::Customer)?;
        Ok(AuthResponse { user, token })
    }

    async fn login(&self, email: &str, password: &str, scope: SessionScope) -> Result<AuthResponse, AppError> {
        let user = match self.user_repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(email, ?scope, "login failed: unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, ?scope, "login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !scope.admits(user.role) {
            tracing::warn!(user_id = %user.id, ?scope, "login refused for role {:?}", user.role);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, ?scope, "login successful");

        let token = self.create_token(&user, scope)?;
        Ok(AuthResponse { user, token })
    }

    /// Resolves a bearer token to its user. A token issued for the other
    /// principal space, or whose user no longer holds a matching role, is
    /// forbidden rather than unauthorized.
    pub async fn validate_token(&self, token: &str, scope: SessionScope) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        if claims.scope != scope {
            return Err(AppError::Forbidden("This session cannot access this area".into()));
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !scope.admits(user.role) {
            return Err(AppError::Forbidden("Insufficient role".into()));
        }

        Ok(user)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub fn create_token(&self, user: &User, scope: SessionScope) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.jwt_ttl_hours);

        let claims = Claims {
            sub: user.id,
            scope,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// bcrypt is CPU bound; keep it off the async workers
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    // connect_lazy never touches the network, so token logic can be tested
    // without a database.
    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AuthService::new(UserRepository::new(pool), secret.into(), 1)
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_round_trips_subject_and_scope() {
        let auth = service("secret");
        let user = user(Role::Customer);
        let token = auth.create_token(&user, SessionScope::Customer).unwrap();

        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.scope, SessionScope::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn foreign_secret_is_invalid() {
        let token = service("one").create_token(&user(Role::Admin), SessionScope::Admin).unwrap();
        assert!(matches!(service("two").decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn admin_token_is_forbidden_in_customer_space() {
        let auth = service("secret");
        let token = auth.create_token(&user(Role::Admin), SessionScope::Admin).unwrap();
        // Rejected on scope before any database lookup
        let err = auth.validate_token(&token, SessionScope::Customer).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("Secret123").await.unwrap();
        assert!(verify_password("Secret123", &hashed).await.unwrap());
        assert!(!verify_password("Secret124", &hashed).await.unwrap());
    }
}
