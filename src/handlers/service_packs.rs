// src/handlers/service_packs.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    models::catalog::{CreateServicePackPayload, ServicePackView, UpdateServicePackPayload},
};

// GET /api/admin/service-packs
#[utoipa::path(
    get,
    path = "/api/admin/service-packs",
    tag = "Admin Service Packs",
    responses((status = 200, description = "All packs, inactive included, newest first", body = Vec<ServicePackView>)),
    security(("api_jwt" = []))
)]
pub async fn list_packs(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let packs = app_state.catalog_service.list_all().await?;
    let views: Vec<ServicePackView> = packs.iter().map(ServicePackView::from).collect();
    Ok(ApiResponse::ok(views))
}

// GET /api/admin/service-packs/{id}
#[utoipa::path(
    get,
    path = "/api/admin/service-packs/{id}",
    tag = "Admin Service Packs",
    params(("id" = Uuid, Path, description = "Service pack id")),
    responses(
        (status = 200, description = "Service pack", body = ServicePackView),
        (status = 404, description = "Service pack not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pack(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pack = app_state.catalog_service.get(id).await?;
    Ok(ApiResponse::ok(ServicePackView::from(&pack)))
}

// POST /api/admin/service-packs
#[utoipa::path(
    post,
    path = "/api/admin/service-packs",
    tag = "Admin Service Packs",
    request_body = CreateServicePackPayload,
    responses(
        (status = 201, description = "Service pack created", body = ServicePackView),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pack(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateServicePackPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pack = app_state.catalog_service.create(payload).await?;
    Ok(ApiResponse::created(ServicePackView::from(&pack)).with_message("Service pack created"))
}

// PUT /api/admin/service-packs/{id}
#[utoipa::path(
    put,
    path = "/api/admin/service-packs/{id}",
    tag = "Admin Service Packs",
    params(("id" = Uuid, Path, description = "Service pack id")),
    request_body = UpdateServicePackPayload,
    responses(
        (status = 200, description = "Service pack updated", body = ServicePackView),
        (status = 404, description = "Service pack not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_pack(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateServicePackPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pack = app_state.catalog_service.update(id, payload).await?;
    Ok(ApiResponse::ok(ServicePackView::from(&pack)).with_message("Service pack updated"))
}

// DELETE /api/admin/service-packs/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/service-packs/{id}",
    tag = "Admin Service Packs",
    params(("id" = Uuid, Path, description = "Service pack id")),
    responses(
        (status = 200, description = "Service pack deleted; orders keep their rows"),
        (status = 404, description = "Service pack not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_pack(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete(id).await?;
    Ok(ApiResponse::message("Service pack deleted"))
}
