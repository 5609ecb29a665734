//! HTTP-level tests for company events: publishing, public registration,
//! tickets, and door check-in.

mod common;

use axum::http::StatusCode;
use common::{
    expect_status, get, get_auth, post_json, post_json_auth, put_json_auth, token_for,
    GOOD_CAPTCHA,
};
use onboard_db::models::user::User;
use serde_json::json;
use sqlx::PgPool;

async fn create_event(app: axum::Router, owner: &User, body: serde_json::Value) -> i64 {
    let json = expect_status(
        post_json_auth(app, "/api/v1/admin/events", body, &token_for(owner)).await,
        StatusCode::CREATED,
    )
    .await;
    json["data"]["id"].as_i64().unwrap()
}

fn meetup(capacity: Option<i32>) -> serde_json::Value {
    json!({
        "title": "Autumn meetup",
        "location": "Main hall",
        "starts_at": "2026-11-20T18:00:00Z",
        "ends_at": "2026-11-20T21:00:00Z",
        "capacity": capacity,
        "is_published": true
    })
}

async fn register(
    app: axum::Router,
    event_id: i64,
    email: &str,
    captcha: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    post_json(
        app,
        &format!("/api/v1/events/{event_id}/registrations"),
        json!({ "name": "Guest Person", "email": email, "captcha_token": captcha }),
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_published_events_are_listed(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);

    create_event(app.clone(), &owner, meetup(Some(10))).await;
    let draft = create_event(
        app.clone(),
        &owner,
        json!({ "title": "Draft", "starts_at": "2026-12-01T09:00:00Z" }),
    )
    .await;

    let listed = expect_status(get(app.clone(), "/api/v1/events").await, StatusCode::OK).await;
    let events = listed["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["remaining_seats"], 10);

    let hidden = get(app, &format!("/api/v1/events/{draft}")).await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn event_end_must_follow_start(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/events",
        json!({
            "title": "Backwards",
            "starts_at": "2026-11-20T18:00:00Z",
            "ends_at": "2026-11-20T17:00:00Z"
        }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn registration_requires_captcha(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(None)).await;

    let missing = register(app.clone(), event_id, "guest@mail.test", None).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let wrong = register(app, event_id, "guest@mail.test", Some("forged")).await;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn registration_issues_a_ticket(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(Some(5))).await;

    let ticket = expect_status(
        register(app.clone(), event_id, "Guest@Mail.test", Some(GOOD_CAPTCHA)).await,
        StatusCode::CREATED,
    )
    .await;
    let reference = ticket["data"]["participant"]["reference_number"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(reference.starts_with(&format!("EVT-{event_id}-")));
    assert_eq!(ticket["data"]["participant"]["email"], "guest@mail.test");
    assert!(ticket["data"]["participant"]["user_id"].is_null());
    assert!(ticket["data"]["qr_payload"]
        .as_str()
        .unwrap()
        .contains(&reference));

    let looked_up = expect_status(
        get(app.clone(), &format!("/api/v1/events/tickets/{reference}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(looked_up["data"]["event"]["id"], event_id);

    let unknown = get(app, "/api/v1/events/tickets/EVT-0-NOPE0000").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn signed_in_registration_links_the_user(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(None)).await;

    let ticket = expect_status(
        post_json_auth(
            app,
            &format!("/api/v1/events/{event_id}/registrations"),
            json!({ "name": "Ada Lovelace", "email": "ada@mail.test", "captcha_token": GOOD_CAPTCHA }),
            &token_for(&user),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(ticket["data"]["participant"]["user_id"], user.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_and_full_capacity_conflict(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(Some(1))).await;

    expect_status(
        register(app.clone(), event_id, "first@mail.test", Some(GOOD_CAPTCHA)).await,
        StatusCode::CREATED,
    )
    .await;

    let duplicate = register(app.clone(), event_id, "FIRST@mail.test", Some(GOOD_CAPTCHA)).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let full = register(app.clone(), event_id, "second@mail.test", Some(GOOD_CAPTCHA)).await;
    assert_eq!(full.status(), StatusCode::CONFLICT);

    let event = expect_status(
        get(app, &format!("/api/v1/events/{event_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(event["data"]["registered_count"], 1);
    assert_eq!(event["data"]["remaining_seats"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn capacity_can_be_lifted_back_to_unlimited(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let token = token_for(&owner);
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(Some(1))).await;
    let uri = format!("/api/v1/admin/events/{event_id}");

    // Leaving capacity out keeps it.
    let renamed = expect_status(
        put_json_auth(app.clone(), &uri, json!({ "title": "Winter meetup" }), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(renamed["data"]["capacity"], 1);

    let unlimited = expect_status(
        put_json_auth(app.clone(), &uri, json!({ "capacity": null }), &token).await,
        StatusCode::OK,
    )
    .await;
    assert!(unlimited["data"]["capacity"].is_null());
    assert!(unlimited["data"]["remaining_seats"].is_null());
    assert_eq!(unlimited["data"]["title"], "Winter meetup");

    for email in ["first@mail.test", "second@mail.test"] {
        expect_status(
            register(app.clone(), event_id, email, Some(GOOD_CAPTCHA)).await,
            StatusCode::CREATED,
        )
        .await;
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn closed_registration_is_rejected(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let mut body = meetup(None);
    body["registration_open"] = json!(false);
    let event_id = create_event(app.clone(), &owner, body).await;

    let response = register(app, event_id, "late@mail.test", Some(GOOD_CAPTCHA)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_in_is_idempotent(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let event_id = create_event(app.clone(), &owner, meetup(None)).await;
    let other_event = create_event(app.clone(), &owner, meetup(None)).await;

    let ticket = expect_status(
        register(app.clone(), event_id, "door@mail.test", Some(GOOD_CAPTCHA)).await,
        StatusCode::CREATED,
    )
    .await;
    let reference = ticket["data"]["participant"]["reference_number"].clone();
    let check_in_uri = format!("/api/v1/admin/events/{event_id}/check-in");

    let first = expect_status(
        post_json_auth(
            app.clone(),
            &check_in_uri,
            json!({ "reference_number": reference }),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(first["data"]["already_checked_in"], false);
    let checked_in_at = first["data"]["participant"]["checked_in_at"].clone();
    assert!(checked_in_at.is_string());

    let second = expect_status(
        post_json_auth(
            app.clone(),
            &check_in_uri,
            json!({ "reference_number": reference }),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(second["data"]["already_checked_in"], true);
    assert_eq!(second["data"]["participant"]["checked_in_at"], checked_in_at);

    // A reference from another event does not check in here.
    let wrong_event = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/events/{other_event}/check-in"),
        json!({ "reference_number": reference }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(wrong_event.status(), StatusCode::NOT_FOUND);

    let participants = expect_status(
        get_auth(
            app,
            &format!("/api/v1/admin/events/{event_id}/participants"),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(participants["data"].as_array().unwrap().len(), 1);
}
