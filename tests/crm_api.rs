//! Contact form, leads, notes, pipeline and stats over HTTP.
//!
//! Requires a running Postgres reachable through `DATABASE_URL`.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;

use common::{admin_token, build_test_app, delete, expect_status, get, patch_json, post_json};

async fn submit_contact(app: &axum::Router, name: &str, email: &str) {
    let response = post_json(
        app,
        "/api/public/contact",
        json!({ "name": name, "email": email, "message": "Can you build us a shop?" }),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["message"], "Message sent successfully!");
}

async fn create_lead(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = post_json(app, "/api/admin/crm/leads", body, Some(token)).await;
    expect_status(response, StatusCode::CREATED).await["data"].clone()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn every_contact_submission_creates_its_own_lead(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    submit_contact(&app, "Khalid", "khalid@example.com").await;
    submit_contact(&app, "Khalid", "khalid@example.com").await;

    let leads = expect_status(get(&app, "/api/admin/crm/leads", Some(&admin)).await, StatusCode::OK).await;
    let leads = leads["data"].as_array().unwrap();
    assert_eq!(leads.len(), 2);
    assert!(leads.iter().all(|l| l["source"] == "contact_form" && l["status"] == "new"));
    assert!(leads.iter().all(|l| l["message"] == "Can you build us a shop?"));

    let lead_id = leads[0]["id"].as_str().unwrap();
    let detail = expect_status(
        get(&app, &format!("/api/admin/crm/leads/{lead_id}"), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["data"]["contact_message"]["email"], "khalid@example.com");
    assert_eq!(detail["data"]["contact_message"]["is_read"], false);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn pipeline_puts_each_lead_in_exactly_one_column(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    for (name, status) in [("A", "new"), ("B", "contacted"), ("C", "qualified"), ("D", "won"), ("E", "lost"), ("F", "won")] {
        create_lead(&app, &admin, json!({ "name": name, "status": status })).await;
    }

    let pipeline = expect_status(get(&app, "/api/admin/crm/pipeline", Some(&admin)).await, StatusCode::OK).await;
    let data = &pipeline["data"];
    let sizes: Vec<usize> = ["new", "contacted", "qualified", "won", "lost"]
        .iter()
        .map(|column| data[column].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, [1, 1, 1, 2, 1]);
    for column in ["new", "contacted", "qualified", "won", "lost"] {
        assert!(data[column].as_array().unwrap().iter().all(|l| l["status"] == column));
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn leads_filter_by_status_and_search(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    create_lead(&app, &admin, json!({ "name": "Atlas Corp", "company": "Atlas", "status": "won" })).await;
    create_lead(&app, &admin, json!({ "name": "Rif Foods", "email": "hello@rif.ma" })).await;
    create_lead(&app, &admin, json!({ "name": "Sahara Tours", "company": "100%_real" })).await;

    let won = expect_status(get(&app, "/api/admin/crm/leads?status=won", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(won["data"].as_array().unwrap().len(), 1);

    let by_email = expect_status(get(&app, "/api/admin/crm/leads?search=RIF.MA", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(by_email["data"][0]["name"], "Rif Foods");

    // LIKE wildcards in the search term are literal
    let literal = expect_status(get(&app, "/api/admin/crm/leads?search=0%25_", Some(&admin)).await, StatusCode::OK).await;
    assert_eq!(literal["data"].as_array().unwrap().len(), 1);
    assert_eq!(literal["data"][0]["name"], "Sahara Tours");

    let response = get(&app, "/api/admin/crm/leads?status=archived", Some(&admin)).await;
    let body = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert!(body["errors"]["status"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn notes_belong_to_their_lead(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    let first = create_lead(&app, &admin, json!({ "name": "First" })).await;
    let second = create_lead(&app, &admin, json!({ "name": "Second" })).await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    let note = expect_status(
        post_json(
            &app,
            &format!("/api/admin/crm/leads/{first_id}/notes"),
            json!({ "content": "Called, wants a quote" }),
            Some(&admin),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let note_id = note["data"]["id"].as_str().unwrap();

    let response = delete(
        &app,
        &format!("/api/admin/crm/leads/{second_id}/notes/{note_id}"),
        Some(&admin),
    )
    .await;
    let body = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(body["message"], "Note does not belong to this lead");

    let detail = expect_status(
        get(&app, &format!("/api/admin/crm/leads/{first_id}"), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["data"]["notes_count"], 1);

    expect_status(
        delete(&app, &format!("/api/admin/crm/leads/{first_id}/notes/{note_id}"), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn deleting_a_lead_removes_its_notes(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    let lead = create_lead(&app, &admin, json!({ "name": "Short lived" })).await;
    let lead_id = lead["id"].as_str().unwrap();
    for content in ["one", "two"] {
        post_json(
            &app,
            &format!("/api/admin/crm/leads/{lead_id}/notes"),
            json!({ "content": content }),
            Some(&admin),
        )
        .await;
    }

    expect_status(
        delete(&app, &format!("/api/admin/crm/leads/{lead_id}"), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;

    let notes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm_notes").fetch_one(&pool).await.unwrap();
    assert_eq!(notes, 0);
    assert_eq!(
        get(&app, &format!("/api/admin/crm/leads/{lead_id}"), Some(&admin)).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn partial_update_changes_only_given_fields(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    let lead = create_lead(
        &app,
        &admin,
        json!({ "name": "Marrakech Spa", "company": "Spa SARL", "estimated_value": 999.0 }),
    )
    .await;
    let uri = format!("/api/admin/crm/leads/{}", lead["id"].as_str().unwrap());

    let updated = expect_status(
        patch_json(&app, &uri, json!({ "status": "qualified", "company": null }), Some(&admin)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["data"]["status"], "qualified");
    assert_eq!(updated["data"]["name"], "Marrakech Spa");
    assert!(updated["data"]["company"].is_null());
    assert_eq!(updated["data"]["estimated_value"], 999.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn stats_report_every_status_and_source(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;

    create_lead(&app, &admin, json!({ "name": "Won deal", "status": "won" })).await;
    submit_contact(&app, "Visitor", "visitor@example.com").await;

    let stats = expect_status(get(&app, "/api/admin/crm/stats", Some(&admin)).await, StatusCode::OK).await;
    let data = &stats["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["by_status"]["won"], 1);
    assert_eq!(data["by_status"]["new"], 1);
    assert_eq!(data["by_status"]["lost"], 0);
    assert_eq!(data["by_source"]["manual"], 1);
    assert_eq!(data["by_source"]["contact_form"], 1);
    assert_eq!(data["recent_leads"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn dashboard_counts_orders_and_leads(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());
    let admin = admin_token(&app, &pool).await;
    create_lead(&app, &admin, json!({ "name": "Big one", "status": "won", "estimated_value": 2499 })).await;
    submit_contact(&app, "Visitor", "visitor@example.com").await;

    let dashboard = expect_status(get(&app, "/api/admin/dashboard", Some(&admin)).await, StatusCode::OK).await;
    let data = &dashboard["data"];
    assert_eq!(data["statistics"]["total_orders"], 0);
    assert_eq!(data["crm"]["total_leads"], 2);
    assert_eq!(data["crm"]["won_leads"], 1);
    assert!(data["recent_orders"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn contact_email_domain_must_accept_mail(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/public/contact",
        json!({ "name": "Bot", "email": "spam@nowhere.invalid", "message": "Hello" }),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert!(body["errors"]["email"].is_array());

    let messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages").fetch_one(&pool).await.unwrap();
    let leads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm_leads").fetch_one(&pool).await.unwrap();
    assert_eq!((messages, leads), (0, 0));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn contact_body_that_is_not_an_object_gets_the_envelope(pool: PgPool) {
    let (app, _mailer) = build_test_app(pool);

    let response = post_json(&app, "/api/public/contact", json!("Can you build us a shop?"), None).await;
    let body = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(body["success"], false);
    assert!(body["errors"]["body"].is_array());
}
