// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    middleware::auth::{AuthenticatedAdmin, AuthenticatedCustomer},
    models::auth::{
        AuthResponse, ForgotPasswordPayload, LoginPayload, RegisterCustomerPayload, ResetPasswordPayload, User,
    },
};

// =============================================================================
//  ADMIN SESSION
// =============================================================================

// POST /api/admin/login
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Admin Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Admin token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials or not an admin")
    )
)]
pub async fn admin_login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let auth = app_state
        .auth_service
        .admin_login(&payload.email, &payload.password)
        .await?;
    Ok(ApiResponse::ok(auth).with_message("Login successful"))
}

// GET /api/admin/me
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "Admin Auth",
    responses(
        (status = 200, description = "Current admin", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_me(AuthenticatedAdmin(user): AuthenticatedAdmin) -> impl IntoResponse {
    ApiResponse::ok(user)
}

// POST /api/admin/logout
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "Admin Auth",
    responses((status = 200, description = "Logged out")),
    security(("api_jwt" = []))
)]
pub async fn admin_logout(AuthenticatedAdmin(user): AuthenticatedAdmin) -> impl IntoResponse {
    tracing::info!(user_id = %user.id, "admin logged out");
    ApiResponse::message("Logged out successfully")
}

// =============================================================================
//  CUSTOMER SESSION
// =============================================================================

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Customer Auth",
    request_body = RegisterCustomerPayload,
    responses(
        (status = 201, description = "Customer account created", body = AuthResponse),
        (status = 409, description = "Email already taken"),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RegisterCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let auth = app_state.auth_service.register_customer(payload).await?;
    Ok(ApiResponse::created(auth).with_message("Registration successful"))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Customer Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Customer token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials or not a customer")
    )
)]
pub async fn customer_login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let auth = app_state
        .auth_service
        .customer_login(&payload.email, &payload.password)
        .await?;
    Ok(ApiResponse::ok(auth).with_message("Login successful"))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Customer Auth",
    responses(
        (status = 200, description = "Current customer", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_me(AuthenticatedCustomer(user): AuthenticatedCustomer) -> impl IntoResponse {
    ApiResponse::ok(user)
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Customer Auth",
    responses((status = 200, description = "Logged out")),
    security(("api_jwt" = []))
)]
pub async fn customer_logout(AuthenticatedCustomer(user): AuthenticatedCustomer) -> impl IntoResponse {
    tracing::info!(user_id = %user.id, "customer logged out");
    ApiResponse::message("Logged out successfully")
}

// =============================================================================
//  PASSWORD RESET
// =============================================================================

// POST /api/auth/forgot-password
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Customer Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 200, description = "Reset link mailed if the email has an account"),
        (status = 422, description = "Invalid email")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state.password_reset_service.request_reset(&payload.email).await?;
    Ok(ApiResponse::message("If that email is registered, a reset link has been sent."))
}

// POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Customer Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Password changed"),
        (status = 422, description = "Invalid data, or an unknown or expired token")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state.password_reset_service.reset(payload).await?;
    Ok(ApiResponse::message("Your password has been reset."))
}
