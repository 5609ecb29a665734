//! HTTP-level tests for the owner console: tickets, performance goals, the
//! user directory, the dashboard, and the activity feed.

mod common;

use axum::http::StatusCode;
use common::{delete_auth, expect_status, get_auth, post_json_auth, put_json_auth, token_for};
use onboard_db::models::activity::NewActivity;
use onboard_db::repositories::ActivityRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn ticket_defaults_to_open_medium(pool: PgPool) {
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let json = expect_status(
        post_json_auth(
            app,
            "/api/v1/tickets",
            json!({
                "title": "VPN access",
                "description": "I cannot reach the staging VPN.",
                "category": "access"
            }),
            &token_for(&user),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["status"], "open");
    assert_eq!(json["data"]["priority"], "medium");
    assert!(json["data"]["resolved_at"].is_null());
    assert_eq!(json["data"]["requester_username"], "user2");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn ticket_rejects_unknown_category(pool: PgPool) {
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/tickets",
        json!({ "title": "Coffee", "description": "More please", "category": "kitchen" }),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tickets_of_other_users_are_hidden(pool: PgPool) {
    let author = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let other = common::create_user(&pool, 3, "Alan", "Turing").await;
    let app = common::build_test_app(pool);

    let ticket = expect_status(
        post_json_auth(
            app.clone(),
            "/api/v1/tickets",
            json!({ "title": "Badge", "description": "Badge broken", "category": "hardware" }),
            &token_for(&author),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let id = ticket["data"]["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), &format!("/api/v1/tickets/{id}"), &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let own = expect_status(
        get_auth(app, "/api/v1/tickets", &token_for(&other)).await,
        StatusCode::OK,
    )
    .await;
    assert!(own["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn resolving_stamps_and_reopening_clears_resolved_at(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let env = common::build_test_env(pool);
    let mut events = env.event_bus.subscribe();
    let owner_token = token_for(&owner);

    let ticket = expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/tickets",
            json!({ "title": "Laptop", "description": "Screen flickers", "category": "hardware" }),
            &token_for(&user),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let uri = format!("/api/v1/admin/tickets/{}", ticket["data"]["id"]);

    let resolved = expect_status(
        put_json_auth(
            env.router.clone(),
            &uri,
            json!({ "status": "resolved", "resolution_notes": "Replaced the panel" }),
            &owner_token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert!(resolved["data"]["resolved_at"].is_string());
    assert_eq!(resolved["data"]["resolution_notes"], "Replaced the panel");

    // Closing keeps the original resolution time.
    let closed = expect_status(
        put_json_auth(env.router.clone(), &uri, json!({ "status": "closed" }), &owner_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(closed["data"]["resolved_at"], resolved["data"]["resolved_at"]);

    let reopened = expect_status(
        put_json_auth(env.router.clone(), &uri, json!({ "status": "in_progress" }), &owner_token)
            .await,
        StatusCode::OK,
    )
    .await;
    assert!(reopened["data"]["resolved_at"].is_null());

    let bad = put_json_auth(env.router, &uri, json!({ "status": "done" }), &owner_token).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let created = events.try_recv().unwrap();
    assert_eq!(created.event_type, "ticket.created");
    let resolved_event = events.try_recv().unwrap();
    assert_eq!(resolved_event.event_type, "ticket.resolved");
    assert_eq!(resolved_event.actor_user_id, Some(owner.id));
    // Moving between terminal statuses does not publish again.
    assert!(events.try_recv().is_err());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_ticket_list_filters_by_status(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    for title in ["First", "Second"] {
        post_json_auth(
            app.clone(),
            "/api/v1/tickets",
            json!({ "title": title, "description": "Details", "category": "other" }),
            &token_for(&user),
        )
        .await;
    }
    let all = expect_status(
        get_auth(app.clone(), "/api/v1/admin/tickets", &token_for(&owner)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let id = all["data"][0]["id"].as_i64().unwrap();
    put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/tickets/{id}"),
        json!({ "status": "resolved" }),
        &token_for(&owner),
    )
    .await;

    let open = expect_status(
        get_auth(app.clone(), "/api/v1/admin/tickets?status=open", &token_for(&owner)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(open["data"].as_array().unwrap().len(), 1);

    let deleted = delete_auth(app, &format!("/api/v1/admin/tickets/{id}"), &token_for(&owner)).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn goal_reports_unclamped_percentage(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let goal = expect_status(
        post_json_auth(
            app.clone(),
            "/api/v1/admin/goals",
            json!({
                "user_id": user.id,
                "month_year": "2026-10",
                "target_hours": 160.0,
                "completed_hours": 80.0,
                "target_story_points": 20.0,
                "completed_story_points": 20.0,
                "checklist": [
                    { "title": "Ship the importer", "completed": true },
                    { "title": "Write the runbook", "completed": false }
                ]
            }),
            &token_for(&owner),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(goal["data"]["percentage"], 75.0);
    assert_eq!(goal["data"]["checklist_completion"], 50.0);

    let id = goal["data"]["id"].as_i64().unwrap();
    let updated = expect_status(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/admin/goals/{id}"),
            json!({ "completed_hours": 320.0, "completed_story_points": 40.0 }),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["data"]["percentage"], 200.0);

    let own = expect_status(
        get_auth(app, "/api/v1/goals?month_year=2026-10", &token_for(&user)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(own["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn goal_is_unique_per_user_and_month(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);
    let body = json!({ "user_id": user.id, "month_year": "2026-11", "target_hours": 10.0 });

    expect_status(
        post_json_auth(app.clone(), "/api/v1/admin/goals", body.clone(), &token_for(&owner)).await,
        StatusCode::CREATED,
    )
    .await;
    let duplicate =
        post_json_auth(app, "/api/v1/admin/goals", body, &token_for(&owner)).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn goal_rejects_bad_month_and_negative_values(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let bad_month = post_json_auth(
        app.clone(),
        "/api/v1/admin/goals",
        json!({ "user_id": user.id, "month_year": "2026-13" }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);

    let negative = post_json_auth(
        app,
        "/api/v1/admin/goals",
        json!({ "user_id": user.id, "month_year": "2026-10", "target_hours": -1.0 }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn current_goal_is_null_without_a_goal(pool: PgPool) {
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let json = expect_status(
        get_auth(app, "/api/v1/goals/current", &token_for(&user)).await,
        StatusCode::OK,
    )
    .await;
    assert!(json["data"].is_null());
}

// ---------------------------------------------------------------------------
// Directory and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_counts_users_and_open_tickets(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    post_json_auth(
        app.clone(),
        "/api/v1/tickets",
        json!({ "title": "Access", "description": "Need Jira", "category": "access" }),
        &token_for(&user),
    )
    .await;

    let json = expect_status(
        get_auth(app, "/api/v1/admin/dashboard", &token_for(&owner)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["total_users"], 2);
    assert_eq!(json["data"]["open_tickets"], 1);
    assert_eq!(json["data"]["verified_users"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn user_detail_includes_profile(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let json = expect_status(
        get_auth(app.clone(), &format!("/api/v1/admin/users/{}", user.id), &token_for(&owner))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["user"]["first_name"], "Ada");
    assert!(json["data"]["recent_activity"].is_array());

    let missing = get_auth(app, "/api/v1/admin/users/999999", &token_for(&owner)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn activity_feed_is_newest_first_and_filterable(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let recorded = [("ticket.created", 1), ("store.redeemed", 2), ("ticket.created", 3)];
    for (event_type, source_id) in recorded {
        ActivityRepo::insert(
            &pool,
            &NewActivity {
                event_type: event_type.to_string(),
                actor_user_id: Some(user.id),
                source_entity_type: Some("ticket".to_string()),
                source_entity_id: Some(source_id),
                payload: json!({}),
            },
        )
        .await
        .unwrap();
    }
    let app = common::build_test_app(pool);
    let token = token_for(&owner);

    let all = expect_status(
        get_auth(app.clone(), "/api/v1/admin/activity", &token).await,
        StatusCode::OK,
    )
    .await;
    let entries = all["data"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["source_entity_id"], 3);
    assert_eq!(entries[0]["actor_user_id"], user.id);

    let tickets = expect_status(
        get_auth(
            app.clone(),
            "/api/v1/admin/activity?event_type=ticket.created&limit=1",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let entries = tickets["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["event_type"], "ticket.created");
    assert_eq!(entries[0]["source_entity_id"], 3);

    let forbidden = get_auth(app, "/api/v1/admin/activity", &token_for(&user)).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}
