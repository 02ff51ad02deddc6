// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::dashboard::Dashboard,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Order, catalog and CRM counters with recent and monthly orders", body = Dashboard),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.dashboard_service.get_dashboard().await?;
    Ok(ApiResponse::ok(dashboard))
}
