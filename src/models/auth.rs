// src/models/auth.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Maps the `user_role` Postgres enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
    Customer,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_customer(self) -> bool {
        self == Role::Customer
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which principal space a token belongs to. Admin and customer sessions are
/// issued by different endpoints and are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    Admin,
    Customer,
}

impl SessionScope {
    pub fn admits(self, role: Role) -> bool {
        match self {
            SessionScope::Admin => role.is_admin(),
            SessionScope::Customer => role.is_customer(),
        }
    }
}

// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub scope: SessionScope,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "Please provide a valid email address"))]
    #[schema(example = "admin@atlastech.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterCustomerPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Sara Benali")]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(
        custom(function = "validate_password_strength"),
        must_match(other = "password_confirmation", message = "The password confirmation does not match.")
    )]
    pub password: String,

    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for CustomerProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(default)]
    #[validate(
        custom(function = "validate_password_strength"),
        must_match(other = "password_confirmation", message = "The password confirmation does not match.")
    )]
    pub password: String,

    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email address"))]
    #[schema(example = "sara@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "The token field is required."))]
    pub token: String,

    #[serde(default)]
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(
        custom(function = "validate_password_strength"),
        must_match(other = "password_confirmation", message = "The password confirmation does not match.")
    )]
    pub password: String,

    #[serde(default)]
    pub password_confirmation: String,
}

/// Reset links stop working after this long.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

// Only the SHA-256 of the token is stored; the plaintext lives in the mail
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub email: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(RESET_TOKEN_TTL_MINUTES)
    }

    /// Issued less than `seconds` ago.
    pub fn is_recent(&self, now: DateTime<Utc>, seconds: i64) -> bool {
        now - self.created_at < Duration::seconds(seconds)
    }
}

/// At least 8 characters with upper and lower case letters and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let mixed_case = password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && mixed_case && has_digit {
        return Ok(());
    }

    let mut error = ValidationError::new("password_strength");
    error.message = Some(
        "The password must be at least 8 characters and contain upper and lower case letters and a number."
            .into(),
    );
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy() {
        assert!(validate_password_strength("Secret123").is_ok());
        assert!(validate_password_strength("short1A").is_err());
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }

    #[test]
    fn change_password_requires_matching_confirmation() {
        let payload = ChangePasswordPayload {
            current_password: "Old12345".into(),
            password: "NewPass123".into(),
            password_confirmation: "NewPass124".into(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn reset_tokens_expire_after_an_hour() {
        let now = Utc::now();
        let token = |age: Duration| PasswordResetToken {
            email: "sara@example.com".into(),
            token_hash: String::new(),
            created_at: now - age,
        };

        assert!(!token(Duration::minutes(59)).is_expired(now));
        assert!(token(Duration::minutes(61)).is_expired(now));
        assert!(token(Duration::seconds(10)).is_recent(now, 60));
        assert!(!token(Duration::seconds(90)).is_recent(now, 60));
    }

    #[test]
    fn reset_payload_applies_the_password_policy() {
        let payload = ResetPasswordPayload {
            token: String::new(),
            email: "sara@example.com".into(),
            password: "weak".into(),
            password_confirmation: "weak".into(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("token"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn scopes_only_admit_their_roles() {
        assert!(SessionScope::Admin.admits(Role::SuperAdmin));
        assert!(SessionScope::Admin.admits(Role::Admin));
        assert!(!SessionScope::Admin.admits(Role::Customer));
        assert!(SessionScope::Customer.admits(Role::Customer));
        assert!(!SessionScope::Customer.admits(Role::Admin));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Admin User".into(),
            email: "admin@atlastech.com".into(),
            password_hash: "$2b$12$secret".into(),
            role: Role::SuperAdmin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "super_admin");
    }
}
