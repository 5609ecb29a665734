//! HTTP-level tests for the form builder and public submissions.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get, get_auth, post_json, post_json_auth, put_json_auth, token_for};
use onboard_db::models::user::User;
use serde_json::{json, Value};
use sqlx::PgPool;

struct Survey {
    form_id: i64,
    name_q: i64,
    team_q: i64,
    team_options: Vec<i64>,
    notes_q: i64,
}

async fn add_question(app: axum::Router, token: &str, form_id: i64, body: Value) -> Value {
    expect_status(
        post_json_auth(app, &format!("/api/v1/admin/forms/{form_id}/questions"), body, token).await,
        StatusCode::CREATED,
    )
    .await
}

/// A published `welcome-survey` form with a required name, a required
/// single-choice team, and optional notes.
async fn build_survey(app: axum::Router, owner: &User) -> Survey {
    let token = token_for(owner);
    let form = expect_status(
        post_json_auth(
            app.clone(),
            "/api/v1/admin/forms",
            json!({ "title": "Welcome survey", "slug": "welcome-survey", "is_published": true }),
            &token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let form_id = form["data"]["id"].as_i64().unwrap();

    let name = add_question(app.clone(), &token, form_id, json!({ "question_type": "short_text", "label": "Your name", "is_required": true })).await;
    let team = add_question(app.clone(), &token, form_id, json!({
        "question_type": "single_choice",
        "label": "Team",
        "is_required": true,
        "options": ["Platform", "Product"]
    }))
    .await;
    let notes = add_question(app.clone(), &token, form_id, json!({ "question_type": "long_text", "label": "Anything else?" })).await;

    Survey {
        form_id,
        name_q: name["data"]["id"].as_i64().unwrap(),
        team_q: team["data"]["id"].as_i64().unwrap(),
        team_options: team["data"]["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_i64().unwrap())
            .collect(),
        notes_q: notes["data"]["id"].as_i64().unwrap(),
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn published_form_is_public_by_slug(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;

    let form = expect_status(
        get(app.clone(), "/api/v1/forms/welcome-survey").await,
        StatusCode::OK,
    )
    .await;
    let questions = form["data"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[1]["options"][0]["label"], "Platform");

    expect_status(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/admin/forms/{}", survey.form_id),
            json!({ "is_published": false }),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let hidden = get(app, "/api/v1/forms/welcome-survey").await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn choice_questions_need_options(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/forms/{}/questions", survey.form_id),
        json!({ "question_type": "multiple_choice", "label": "Pick some" }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_required_answer_is_rejected(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;

    let response = post_json(
        app,
        "/api/v1/forms/welcome-survey/submissions",
        json!({ "answers": { survey.name_q.to_string(): "Ada" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn required_consent_box_must_be_ticked(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;
    let consent = add_question(
        app.clone(),
        &token_for(&owner),
        survey.form_id,
        json!({ "question_type": "checkbox", "label": "I agree to the code of conduct", "is_required": true }),
    )
    .await;
    let consent_q = consent["data"]["id"].as_i64().unwrap();

    let answers = |agreed: bool| {
        json!({ "answers": {
            survey.name_q.to_string(): "Ada",
            survey.team_q.to_string(): survey.team_options[0],
            consent_q.to_string(): agreed,
        } })
    };

    let declined = post_json(
        app.clone(),
        "/api/v1/forms/welcome-survey/submissions",
        answers(false),
    )
    .await;
    let json = expect_status(declined, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    expect_status(
        post_json(app, "/api/v1/forms/welcome-survey/submissions", answers(true)).await,
        StatusCode::CREATED,
    )
    .await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_option_and_foreign_question_are_rejected(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;

    let bad_option = post_json(
        app.clone(),
        "/api/v1/forms/welcome-survey/submissions",
        json!({ "answers": {
            survey.name_q.to_string(): "Ada",
            survey.team_q.to_string(): 999_999
        } }),
    )
    .await;
    assert_eq!(bad_option.status(), StatusCode::BAD_REQUEST);

    let foreign = post_json(
        app,
        "/api/v1/forms/welcome-survey/submissions",
        json!({ "answers": {
            survey.name_q.to_string(): "Ada",
            survey.team_q.to_string(): survey.team_options[0],
            "999999": "stray"
        } }),
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn valid_submission_is_stored_without_blank_answers(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let respondent = common::create_user(&pool, 2, "Ada", "Lovelace").await;
    let env = common::build_test_env(pool);
    let survey = build_survey(env.router.clone(), &owner).await;
    let mut events = env.event_bus.subscribe();

    let submitted = expect_status(
        post_json_auth(
            env.router.clone(),
            "/api/v1/forms/welcome-survey/submissions",
            json!({ "answers": {
                survey.name_q.to_string(): "Ada",
                survey.team_q.to_string(): survey.team_options[1],
                survey.notes_q.to_string(): "   "
            } }),
            &token_for(&respondent),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(submitted["data"]["user_id"], respondent.id);
    let answers = submitted["data"]["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0]["question_id"], survey.name_q);
    assert_eq!(answers[1]["value"], survey.team_options[1]);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, "form.submitted");
    assert_eq!(event.actor_user_id, Some(respondent.id));

    let listed = expect_status(
        get_auth(
            env.router,
            &format!("/api/v1/admin/forms/{}/submissions", survey.form_id),
            &token_for(&owner),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn questions_reorder_by_permutation(pool: PgPool) {
    let owner = common::create_owner(&pool, 1).await;
    let app = common::build_test_app(pool);
    let survey = build_survey(app.clone(), &owner).await;
    let uri = format!("/api/v1/admin/forms/{}/questions/order", survey.form_id);

    let partial = put_json_auth(
        app.clone(),
        &uri,
        json!({ "ids": [survey.notes_q] }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(partial.status(), StatusCode::BAD_REQUEST);

    let ok = put_json_auth(
        app.clone(),
        &uri,
        json!({ "ids": [survey.notes_q, survey.name_q, survey.team_q] }),
        &token_for(&owner),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let tree = expect_status(
        get_auth(app, &format!("/api/v1/admin/forms/{}", survey.form_id), &token_for(&owner)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(tree["data"]["questions"][0]["id"], survey.notes_q);
}
