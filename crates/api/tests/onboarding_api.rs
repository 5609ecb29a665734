//! HTTP-level tests for the onboarding wizard: bio, company email
//! verification, and the checklist steps.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get_auth, post_json_auth, put_json_auth, token_for};
use onboard_db::models::user::{ProvisionUser, User};
use onboard_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

/// A freshly provisioned GitHub user with no name on file.
async fn nameless_user(pool: &PgPool, github_id: i64) -> User {
    UserRepo::provision(
        pool,
        &ProvisionUser {
            github_id,
            github_username: format!("anon{github_id}"),
            avatar_url: None,
            personal_email: None,
            first_name: None,
            last_name: None,
        },
    )
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bio_requires_both_names(pool: PgPool) {
    let user = nameless_user(&pool, 1).await;
    let app = common::build_test_app(pool);

    let json = expect_status(
        put_json_auth(
            app,
            "/api/v1/profile/bio",
            json!({ "first_name": "Ada", "last_name": "   " }),
            &token_for(&user),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bio_is_trimmed_and_saved(pool: PgPool) {
    let user = nameless_user(&pool, 1).await;
    let app = common::build_test_app(pool);

    let json = expect_status(
        put_json_auth(
            app,
            "/api/v1/profile/bio",
            json!({ "first_name": "  Ada ", "last_name": "Lovelace", "department": "Engineering" }),
            &token_for(&user),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["first_name"], "Ada");
    assert_eq!(json["data"]["department"], "Engineering");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_rejects_foreign_domain(pool: PgPool) {
    let user = common::create_user(&pool, 1, "Ada", "Lovelace").await;
    let env = common::build_test_env(pool);

    let response = post_json_auth(
        env.router,
        "/api/v1/profile/email/otp",
        json!({ "email": "ada@gmail.com" }),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(env.mailer.last_code().is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_round_trip_verifies_company_email(pool: PgPool) {
    let user = common::create_user(&pool, 1, "Ada", "Lovelace").await;
    let token = token_for(&user);
    let env = common::build_test_env(pool);

    let sent = expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/profile/email/otp",
            json!({ "email": "Ada@Example.com" }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(sent["data"]["email"], "ada@example.com");

    let code = env.mailer.last_code().expect("a code should have been mailed");
    assert_eq!(code.len(), 6);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let mismatch = post_json_auth(
        env.router.clone(),
        "/api/v1/profile/email/verify",
        json!({ "code": wrong }),
        &token,
    )
    .await;
    assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

    let verified = expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/profile/email/verify",
            json!({ "code": code }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(verified["data"]["company_email"], "ada@example.com");
    assert_eq!(verified["data"]["company_email_verified"], true);

    let resend = post_json_auth(
        env.router,
        "/api/v1/profile/email/otp",
        json!({ "email": "ada@example.com" }),
        &token,
    )
    .await;
    assert_eq!(resend.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn otp_locks_after_too_many_wrong_codes(pool: PgPool) {
    let user = common::create_user(&pool, 1, "Ada", "Lovelace").await;
    let token = token_for(&user);
    let env = common::build_test_env(pool);

    post_json_auth(
        env.router.clone(),
        "/api/v1/profile/email/otp",
        json!({ "email": "ada@example.com" }),
        &token,
    )
    .await;
    let code = env.mailer.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..5 {
        let response = post_json_auth(
            env.router.clone(),
            "/api/v1/profile/email/verify",
            json!({ "code": wrong }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Even the right code is refused once the attempts are spent.
    let response = post_json_auth(
        env.router,
        "/api/v1/profile/email/verify",
        json!({ "code": code }),
        &token,
    )
    .await;
    assert_ne!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn company_email_cannot_be_claimed_twice(pool: PgPool) {
    let first = common::create_user(&pool, 1, "Ada", "Lovelace").await;
    let second = common::create_user(&pool, 2, "Alan", "Turing").await;
    let env = common::build_test_env(pool);

    post_json_auth(
        env.router.clone(),
        "/api/v1/profile/email/otp",
        json!({ "email": "shared@example.com" }),
        &token_for(&first),
    )
    .await;
    let code = env.mailer.last_code().unwrap();
    expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/profile/email/verify",
            json!({ "code": code }),
            &token_for(&first),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let response = post_json_auth(
        env.router,
        "/api/v1/profile/email/otp",
        json!({ "email": "shared@example.com" }),
        &token_for(&second),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wizard_walks_through_every_step(pool: PgPool) {
    let user = nameless_user(&pool, 1).await;
    let token = token_for(&user);
    let env = common::build_test_env(pool);

    let status = expect_status(
        get_auth(env.router.clone(), "/api/v1/profile/wizard", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(status["data"]["next_step"], "bio");
    assert_eq!(status["data"]["is_complete"], false);

    let premature = post_json_auth(
        env.router.clone(),
        "/api/v1/profile/wizard/complete",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(premature.status(), StatusCode::BAD_REQUEST);

    put_json_auth(
        env.router.clone(),
        "/api/v1/profile/bio",
        json!({ "first_name": "Ada", "last_name": "Lovelace" }),
        &token,
    )
    .await;
    let status = expect_status(
        get_auth(env.router.clone(), "/api/v1/profile/wizard", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(status["data"]["bio_completed"], true);
    assert_eq!(status["data"]["next_step"], "email");

    post_json_auth(
        env.router.clone(),
        "/api/v1/profile/email/otp",
        json!({ "email": "ada@example.com" }),
        &token,
    )
    .await;
    let code = env.mailer.last_code().unwrap();
    post_json_auth(
        env.router.clone(),
        "/api/v1/profile/email/verify",
        json!({ "code": code }),
        &token,
    )
    .await;

    // No onboarding steps are configured, so the checklist is already done.
    let completed = expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/profile/wizard/complete",
            json!({}),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(completed["data"]["is_complete"], true);
    assert!(completed["data"]["next_step"].is_null());
    let completed_at = completed["data"]["onboarding_completed_at"].clone();
    assert!(completed_at.is_string());

    let again = expect_status(
        post_json_auth(
            env.router,
            "/api/v1/profile/wizard/complete",
            json!({}),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(again["data"]["onboarding_completed_at"], completed_at);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn onboarding_steps_track_per_user_progress(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let user = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let app = common::build_test_app(pool);

    let step = expect_status(
        post_json_auth(
            app.clone(),
            "/api/v1/admin/onboarding-steps",
            json!({ "title": "Join the team chat", "link_url": "https://chat.example.com" }),
            &token_for(&owner),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let step_id = step["data"]["id"].as_i64().unwrap();

    let overview = expect_status(
        get_auth(app.clone(), "/api/v1/checklist/steps", &token_for(&user)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(overview["data"]["progress"]["total"], 1);
    assert_eq!(overview["data"]["progress"]["is_complete"], false);

    let toggled = expect_status(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/checklist/steps/{step_id}"),
            json!({ "completed": true }),
            &token_for(&user),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(toggled["data"]["steps"][0]["completed"], true);
    assert_eq!(toggled["data"]["progress"]["is_complete"], true);

    // The owner's own view is untouched.
    let owner_view = expect_status(
        get_auth(app, "/api/v1/checklist/steps", &token_for(&owner)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(owner_view["data"]["progress"]["completed"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn assigned_checklist_items_are_private_to_the_assignee(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let assignee = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let other = common::create_user(&pool, 3, "Alan", "Turing").await;
    let app = common::build_test_app(pool);
    let owner_token = token_for(&owner);

    let checklist = expect_status(
        post_json_auth(
            app.clone(),
            "/api/v1/admin/checklists",
            json!({ "title": "Laptop setup" }),
            &owner_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let checklist_id = checklist["data"]["id"].as_i64().unwrap();

    let item = expect_status(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/admin/checklists/{checklist_id}/items"),
            json!({ "title": "Enable disk encryption" }),
            &owner_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let item_id = item["data"]["id"].as_i64().unwrap();

    let assignment = expect_status(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/admin/checklists/{checklist_id}/assignments"),
            json!({ "user_id": assignee.id }),
            &owner_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let assignment_id = assignment["data"]["id"].as_i64().unwrap();
    let toggle_uri = format!("/api/v1/checklist/assignments/{assignment_id}/items/{item_id}");

    let foreign = put_json_auth(
        app.clone(),
        &toggle_uri,
        json!({ "completed": true }),
        &token_for(&other),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let view = expect_status(
        put_json_auth(
            app.clone(),
            &toggle_uri,
            json!({ "completed": true }),
            &token_for(&assignee),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(view["data"]["progress"]["completed"], 1);
    assert_eq!(view["data"]["items"][0]["completed"], true);

    let listed = expect_status(
        get_auth(app, "/api/v1/checklist/assignments", &token_for(&assignee)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["checklist_title"], "Laptop setup");
}
