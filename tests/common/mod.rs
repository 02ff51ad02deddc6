//! Shared helpers for the HTTP-level integration tests.
//!
//! Every test gets a fresh database from `#[sqlx::test]`; the router is the
//! one `main` serves, wired with an in-memory mailer.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use atlastech_backend::{
    app::build_router,
    config::{AppState, Config},
    db::UserRepository,
    mail::{MailError, Mailer, OutgoingMail},
    models::auth::Role,
    services::auth::hash_password,
};

pub const ADMIN_EMAIL: &str = "admin@atlastech.test";
pub const ADMIN_PASSWORD: &str = "Admin-pass-1";
pub const CUSTOMER_PASSWORD: &str = "Customer-pass-1";

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        bind_addr: "127.0.0.1:0".into(),
        max_connections: 2,
        cors_origins: vec!["http://localhost:5173".into()],
        mail_from: "AtlasTech Solutions <noreply@atlastech.test>".into(),
        smtp: None,
        frontend_url: "http://localhost:5173".into(),
        email_dns_check: false,
        seed_on_startup: false,
        admin_seed_password: None,
    }
}

/// Keeps every message it is asked to deliver.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications are delivered from spawned tasks, so give them a moment.
    pub async fn wait_for(&self, count: usize) -> Vec<OutgoingMail> {
        for _ in 0..50 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Always fails, like an unreachable SMTP relay.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
        let address: Result<lettre::Address, _> = "not an address".parse();
        Err(MailError::Address(address.unwrap_err()))
    }
}

pub fn build_test_app(pool: PgPool) -> (Router, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::from_parts(pool, test_config(), mailer.clone());
    (build_router(state).expect("router should build"), mailer)
}

pub fn build_test_app_with_mailer(pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    let state = AppState::from_parts(pool, test_config(), mailer);
    build_router(state).expect("router should build")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, None, token).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value, token: Option<&str>) -> Response {
    send(app, Method::POST, uri, Some(body), token).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value, token: Option<&str>) -> Response {
    send(app, Method::PUT, uri, Some(body), token).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value, token: Option<&str>) -> Response {
    send(app, Method::PATCH, uri, Some(body), token).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, None, token).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Asserts the status and returns the decoded body.
pub async fn expect_status(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

// ---------------------------------------------------------------------------
// Sessions and fixtures
// ---------------------------------------------------------------------------

/// Inserts a staff account and logs it in through the admin endpoint.
pub async fn admin_token(app: &Router, pool: &PgPool) -> String {
    let hash = hash_password(ADMIN_PASSWORD).await.unwrap();
    UserRepository::new(pool.clone())
        .create("Test Admin", ADMIN_EMAIL, &hash, Role::SuperAdmin)
        .await
        .unwrap();

    let response = post_json(
        app,
        "/api/admin/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    body["data"]["token"].as_str().unwrap().to_owned()
}

/// Registers a customer and returns its token.
pub async fn customer_token(app: &Router, name: &str, email: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/register",
        json!({
            "name": name,
            "email": email,
            "password": CUSTOMER_PASSWORD,
            "password_confirmation": CUSTOMER_PASSWORD,
        }),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    body["data"]["token"].as_str().unwrap().to_owned()
}

/// Creates a pack through the back office and returns its id.
pub async fn create_pack(app: &Router, token: &str, name: &str, price: f64, is_active: bool) -> String {
    let response = post_json(
        app,
        "/api/admin/service-packs",
        json!({
            "name": name,
            "description": format!("{name} description"),
            "price": price,
            "features": ["Responsive design", "SEO"],
            "is_active": is_active,
        }),
        Some(token),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    body["data"]["id"].as_str().unwrap().to_owned()
}

pub async fn place_order(app: &Router, pack_id: &str, name: &str, email: &str, token: Option<&str>) -> Value {
    let response = post_json(
        app,
        "/api/public/orders",
        json!({
            "customer_name": name,
            "email": email,
            "phone": "+212600000000",
            "selected_pack_id": pack_id,
            "notes": "Need it before summer",
        }),
        token,
    )
    .await;
    expect_status(response, StatusCode::CREATED).await
}
