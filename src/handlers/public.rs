// src/handlers/public.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    middleware::auth::MaybeCustomer,
    models::{
        catalog::ServicePackView,
        contact::ContactPayload,
        order::{OrderView, PlaceOrderPayload},
    },
};

const ORDER_FAILED: &str = "Failed to place order. Please try again.";
const CONTACT_FAILED: &str = "Failed to send message. Please try again.";

// GET /api/public/service-packs
#[utoipa::path(
    get,
    path = "/api/public/service-packs",
    tag = "Public",
    responses(
        (status = 200, description = "Active service packs only", body = Vec<ServicePackView>)
    )
)]
pub async fn list_service_packs(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let packs = app_state.catalog_service.list_active().await?;
    let views: Vec<ServicePackView> = packs.iter().map(ServicePackView::from).collect();
    Ok(ApiResponse::ok(views))
}

// POST /api/public/orders
#[utoipa::path(
    post,
    path = "/api/public/orders",
    tag = "Public",
    request_body = PlaceOrderPayload,
    responses(
        (status = 201, description = "Order placed", body = OrderView),
        (status = 422, description = "Invalid data or unknown service pack"),
        (status = 500, description = "Failed to place order")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn place_order(
    State(app_state): State<AppState>,
    MaybeCustomer(customer): MaybeCustomer,
    AppJson(payload): AppJson<PlaceOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (order, _mail) = app_state
        .order_service
        .place_order(payload, customer.as_ref())
        .await
        .map_err(|e| e.masked("order creation failed", ORDER_FAILED))?;

    Ok(ApiResponse::created(order).with_message("Order placed successfully!"))
}

// POST /api/public/contact
#[utoipa::path(
    post,
    path = "/api/public/contact",
    tag = "Public",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Message stored and lead opened"),
        (status = 422, description = "Invalid data"),
        (status = 500, description = "Failed to send message")
    )
)]
pub async fn submit_contact(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<ContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .crm_service
        .submit_contact(payload)
        .await
        .map_err(|e| e.masked("contact form submission failed", CONTACT_FAILED))?;

    Ok(ApiResponse::message("Message sent successfully!").with_status(StatusCode::CREATED))
}
