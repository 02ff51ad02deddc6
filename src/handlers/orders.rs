// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    models::order::{OrderView, UpdateOrderStatusPayload},
};

// GET /api/admin/orders
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin Orders",
    responses((status = 200, description = "All orders, newest first", body = Vec<OrderView>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list().await?;
    Ok(ApiResponse::ok(orders))
}

// GET /api/admin/orders/{id}
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Admin Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderView),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get(id).await?;
    Ok(ApiResponse::ok(order))
}

// PATCH /api/admin/orders/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}",
    tag = "Admin Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status stored; the customer is mailed in the background", body = OrderView),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (order, _mail) = app_state.order_service.update_status(id, payload.status).await?;
    Ok(ApiResponse::ok(order).with_message("Order status updated"))
}

// DELETE /api/admin/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    tag = "Admin Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.order_service.delete(id).await?;
    Ok(ApiResponse::message("Order deleted"))
}
