// src/app.rs

use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{admin_guard, customer_guard},
};

/// The whole HTTP surface under `/api`. Used by `main` and by the
/// integration tests so both run the same routes and layers.
pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    let cors = build_cors_layer(&app_state.config.cors_origins)?;

    // Storefront, no session required
    let public_routes = Router::new()
        .route("/service-packs", get(handlers::public::list_service_packs))
        .route("/orders", post(handlers::public::place_order))
        .route("/contact", post(handlers::public::submit_contact));

    // Customer session
    let customer_auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::customer_login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::customer_me))
                .route("/logout", post(handlers::auth::customer_logout))
                .layer(axum_middleware::from_fn_with_state(app_state.clone(), customer_guard)),
        );

    let customer_routes = Router::new()
        .route("/orders", get(handlers::customer::list_orders))
        .route(
            "/profile",
            get(handlers::customer::get_profile).put(handlers::customer::update_profile),
        )
        .route("/password", axum::routing::put(handlers::customer::change_password))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), customer_guard));

    // Back office
    let admin_protected = Router::new()
        .route("/me", get(handlers::auth::admin_me))
        .route("/logout", post(handlers::auth::admin_logout))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/orders", get(handlers::orders::list_orders))
        .route(
            "/orders/{id}",
            get(handlers::orders::get_order)
                .patch(handlers::orders::update_order_status)
                .put(handlers::orders::update_order_status)
                .delete(handlers::orders::delete_order),
        )
        .route(
            "/service-packs",
            get(handlers::service_packs::list_packs).post(handlers::service_packs::create_pack),
        )
        .route(
            "/service-packs/{id}",
            get(handlers::service_packs::get_pack)
                .put(handlers::service_packs::update_pack)
                .delete(handlers::service_packs::delete_pack),
        )
        .route(
            "/crm/leads",
            get(handlers::crm::list_leads).post(handlers::crm::create_lead),
        )
        .route(
            "/crm/leads/{id}",
            get(handlers::crm::get_lead)
                .put(handlers::crm::update_lead)
                .patch(handlers::crm::update_lead)
                .delete(handlers::crm::delete_lead),
        )
        .route("/crm/leads/{id}/notes", post(handlers::crm::add_note))
        .route(
            "/crm/leads/{id}/notes/{note_id}",
            axum::routing::delete(handlers::crm::delete_note),
        )
        .route("/crm/pipeline", get(handlers::crm::get_pipeline))
        .route("/crm/stats", get(handlers::crm::get_stats))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), admin_guard));

    let admin_routes = Router::new()
        .route("/login", post(handlers::auth::admin_login))
        .merge(admin_protected);

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/public", public_routes)
        .nest("/auth", customer_auth_routes)
        .nest("/customer", customer_routes)
        .nest("/admin", admin_routes);

    Ok(Router::new()
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(app_state))
}

pub fn build_cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {:?}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}
