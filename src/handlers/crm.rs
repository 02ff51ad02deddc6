// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, json::AppJson, response::ApiResponse},
    config::AppState,
    models::crm::{
        CreateLeadPayload, CreateNotePayload, LeadDetail, LeadFilter, LeadStats, LeadSummary, Note, Pipeline,
        UpdateLeadPayload,
    },
};

// =============================================================================
//  LEADS
// =============================================================================

// GET /api/admin/crm/leads
#[utoipa::path(
    get,
    path = "/api/admin/crm/leads",
    tag = "CRM",
    params(LeadFilter),
    responses(
        (status = 200, description = "Leads newest first, with note counts", body = Vec<LeadSummary>),
        (status = 422, description = "Unknown status filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(filter): Query<LeadFilter>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.list_leads(filter).await?;
    Ok(ApiResponse::ok(leads))
}

// POST /api/admin/crm/leads
#[utoipa::path(
    post,
    path = "/api/admin/crm/leads",
    tag = "CRM",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead created", body = LeadSummary),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lead = app_state.crm_service.create_lead(payload).await?;
    Ok(ApiResponse::created(lead).with_message("Lead created successfully"))
}

// GET /api/admin/crm/leads/{id}
#[utoipa::path(
    get,
    path = "/api/admin/crm/leads/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead with notes, source message and orders by email", body = LeadDetail),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.crm_service.get_lead(id).await?;
    Ok(ApiResponse::ok(lead))
}

// PUT /api/admin/crm/leads/{id}
#[utoipa::path(
    put,
    path = "/api/admin/crm/leads/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead updated", body = LeadDetail),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lead = app_state.crm_service.update_lead(id, payload).await?;
    Ok(ApiResponse::ok(lead).with_message("Lead updated"))
}

// DELETE /api/admin/crm/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/crm/leads/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead and its notes deleted"),
        (status = 404, description = "Lead not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_lead(id).await?;
    Ok(ApiResponse::message("Lead deleted"))
}

// =============================================================================
//  BOARD & STATS
// =============================================================================

// GET /api/admin/crm/pipeline
#[utoipa::path(
    get,
    path = "/api/admin/crm/pipeline",
    tag = "CRM",
    responses((status = 200, description = "Every lead in its status column", body = Pipeline)),
    security(("api_jwt" = []))
)]
pub async fn get_pipeline(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pipeline = app_state.crm_service.pipeline().await?;
    Ok(ApiResponse::ok(pipeline))
}

// GET /api/admin/crm/stats
#[utoipa::path(
    get,
    path = "/api/admin/crm/stats",
    tag = "CRM",
    responses((status = 200, description = "Lead counts and most recent leads", body = LeadStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.crm_service.stats().await?;
    Ok(ApiResponse::ok(stats))
}

// =============================================================================
//  NOTES
// =============================================================================

// POST /api/admin/crm/leads/{id}/notes
#[utoipa::path(
    post,
    path = "/api/admin/crm/leads/{id}/notes",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = CreateNotePayload,
    responses(
        (status = 201, description = "Note added", body = Note),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    Path(lead_id): Path<Uuid>,
    AppJson(payload): AppJson<CreateNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let note = app_state.crm_service.add_note(lead_id, &payload.content).await?;
    Ok(ApiResponse::created(note).with_message("Note added"))
}

// DELETE /api/admin/crm/leads/{id}/notes/{note_id}
#[utoipa::path(
    delete,
    path = "/api/admin/crm/leads/{id}/notes/{note_id}",
    tag = "CRM",
    params(
        ("id" = Uuid, Path, description = "Lead id"),
        ("note_id" = Uuid, Path, description = "Note id")
    ),
    responses(
        (status = 200, description = "Note deleted"),
        (status = 403, description = "Note does not belong to this lead"),
        (status = 404, description = "Lead or note not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    Path((lead_id, note_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_note(lead_id, note_id).await?;
    Ok(ApiResponse::message("Note deleted"))
}
