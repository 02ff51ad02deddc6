// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::json::rejected_field;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Malformed request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Current password is incorrect")]
    IncorrectPassword,

    // User-safe failure raised by the public write endpoints. The real cause
    // has already been logged when this is built.
    #[error("{0}")]
    RequestFailed(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Builds a single-field validation error, for rules that need the database
    /// (existence checks) and therefore can't live in a `#[validate]` attribute.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Keeps client-correctable errors and replaces anything else with a
    /// generic, user-safe message. The original error is logged.
    pub fn masked(self, context: &'static str, message: &'static str) -> Self {
        if self.is_client_error() {
            return self;
        }
        tracing::error!(error = %self, "{}", context);
        AppError::RequestFailed(message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidBody(rejection) => rejection.status(),
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IncorrectPassword => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("The {} field is invalid.", field))
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "message": "The given data was invalid.",
                    "errors": details,
                }));
                return (status, body).into_response();
            }
            // Well-formed JSON of the wrong shape is reported like a failed rule
            AppError::InvalidBody(JsonRejection::JsonDataError(rejection)) => {
                let (field, missing) = rejected_field(&rejection.body_text());
                let reason = if missing { "required" } else { "invalid" };
                let details = HashMap::from([(
                    field.clone(),
                    vec![format!("The {} field is {}.", field, reason)],
                )]);
                let body = Json(json!({
                    "success": false,
                    "message": "The given data was invalid.",
                    "errors": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidBody(rejection) => rejection.body_text(),
            AppError::EmailAlreadyExists => "The email has already been taken.".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::InvalidToken => "Unauthenticated.".to_string(),
            AppError::Forbidden(message) => message.clone(),
            AppError::NotFound(entity) => format!("{} not found", entity),
            AppError::IncorrectPassword => "Current password is incorrect".to_string(),
            AppError::RequestFailed(message) => message.to_string(),
            e => {
                tracing::error!("Internal server error: {}", e);
                "An unexpected error occurred.".to_string()
            }
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}
