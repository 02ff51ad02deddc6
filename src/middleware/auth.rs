// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{SessionScope, User},
};

// Request extensions set by the guards. Distinct types keep an admin user from
// ever being read as a customer.
#[derive(Clone)]
struct AdminSession(User);

#[derive(Clone)]
struct CustomerSession(User);

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
}

/// Requires an admin-scoped token whose user is still an admin or super admin.
pub async fn admin_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let user = app_state
        .auth_service
        .validate_token(&token, SessionScope::Admin)
        .await?;

    request.extensions_mut().insert(AdminSession(user));
    Ok(next.run(request).await)
}

/// Requires a customer-scoped token whose user still has the customer role.
pub async fn customer_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let user = app_state
        .auth_service
        .validate_token(&token, SessionScope::Customer)
        .await?;

    request.extensions_mut().insert(CustomerSession(user));
    Ok(next.run(request).await)
}

// Extractor for handlers mounted behind `admin_guard`
pub struct AuthenticatedAdmin(pub User);

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .map(|session| AuthenticatedAdmin(session.0.clone()))
            .ok_or(AppError::InvalidToken)
    }
}

// Extractor for handlers mounted behind `customer_guard`
pub struct AuthenticatedCustomer(pub User);

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CustomerSession>()
            .map(|session| AuthenticatedCustomer(session.0.clone()))
            .ok_or(AppError::InvalidToken)
    }
}

/// Optional customer session for public endpoints. A missing, invalid or
/// non-customer token yields `None` instead of rejecting the request.
pub struct MaybeCustomer(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeCustomer
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeCustomer(None));
        };

        let app_state = AppState::from_ref(state);
        match app_state
            .auth_service
            .validate_token(&token, SessionScope::Customer)
            .await
        {
            Ok(user) => Ok(MaybeCustomer(Some(user))),
            // A broken database is still an error; a bad token is just ignored
            Err(e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_))) => Err(e),
            Err(_) => Ok(MaybeCustomer(None)),
        }
    }
}
