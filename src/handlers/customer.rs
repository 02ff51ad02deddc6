// src/handlers/customer.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedCustomer,
    models::{
        auth::{ChangePasswordPayload, CustomerProfile, UpdateProfilePayload},
        order::OrderView,
    },
};

// GET /api/customer/orders
#[utoipa::path(
    get,
    path = "/api/customer/orders",
    tag = "Customer",
    responses(
        (status = 200, description = "The customer's own orders, newest first", body = Vec<OrderView>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a customer session")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.customer_service.orders(&customer).await?;
    Ok(ApiResponse::ok(orders))
}

// GET /api/customer/profile
#[utoipa::path(
    get,
    path = "/api/customer/profile",
    tag = "Customer",
    responses((status = 200, description = "Profile", body = CustomerProfile)),
    security(("api_jwt" = []))
)]
pub async fn get_profile(AuthenticatedCustomer(customer): AuthenticatedCustomer) -> impl IntoResponse {
    ApiResponse::ok(CustomerProfile::from(&customer))
}

// PUT /api/customer/profile
#[utoipa::path(
    put,
    path = "/api/customer/profile",
    tag = "Customer",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = CustomerProfile),
        (status = 409, description = "Email belongs to another account"),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    AppJson(payload): AppJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = app_state.customer_service.update_profile(&customer, payload).await?;
    Ok(ApiResponse::ok(CustomerProfile::from(&user)).with_message("Profile updated"))
}

// PUT /api/customer/password
#[utoipa::path(
    put,
    path = "/api/customer/password",
    tag = "Customer",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Current password is incorrect"),
        (status = 422, description = "New password rejected by policy")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    AppJson(payload): AppJson<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state.customer_service.change_password(&customer, payload).await?;
    Ok(ApiResponse::message("Password updated"))
}
