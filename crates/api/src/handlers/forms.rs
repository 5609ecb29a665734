//! Forms builder: owners design forms, anyone can fill in published ones.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::forms::{has_answer, validate_question, validate_submission, QuestionRule};
use onboard_core::landing::{validate_slug, validate_title};
use onboard_core::types::DbId;
use onboard_db::models::form::{
    CreateForm, CreateQuestion, Form, FormTree, QuestionWithOptions, SubmissionWithAnswers,
    UpdateForm, UpdateQuestion,
};
use onboard_db::repositories::FormRepo;
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::landing::{reorder_result, ReorderRequest};
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::guards::RequireOwner;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /forms/{slug}/submissions`, keyed by question id.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: HashMap<DbId, serde_json::Value>,
}

async fn ensure_form(state: &AppState, id: DbId) -> AppResult<Form> {
    FormRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Form", id))
}

fn question_rule(q: &QuestionWithOptions) -> QuestionRule {
    QuestionRule {
        id: q.question.id,
        question_type: q.question.question_type.clone(),
        is_required: q.question.is_required,
        option_ids: q.options.iter().map(|o| o.id).collect(),
    }
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/forms/{slug}
pub async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<FormTree>>> {
    let form = FormRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    let tree = FormRepo::tree(&state.pool, form).await?;
    Ok(Json(DataResponse { data: tree }))
}

/// POST /api/v1/forms/{slug}/submissions
///
/// Blank answers to optional questions are dropped before storing.
pub async fn submit(
    State(state): State<AppState>,
    maybe_auth: MaybeAuthUser,
    Path(slug): Path<String>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionWithAnswers>>)> {
    let form = FormRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    let questions = FormRepo::questions(&state.pool, form.id).await?;
    let rules: Vec<QuestionRule> = questions.iter().map(question_rule).collect();
    validate_submission(&rules, &input.answers)?;

    // Store answers in question order.
    let answers: Vec<(DbId, serde_json::Value)> = rules
        .iter()
        .filter_map(|rule| {
            input
                .answers
                .get(&rule.id)
                .filter(|value| has_answer(value))
                .map(|value| (rule.id, value.clone()))
        })
        .collect();

    let user_id = maybe_auth.user_id();
    let submission = FormRepo::submit(&state.pool, form.id, user_id, &answers).await?;

    tracing::info!(form_id = form.id, submission_id = submission.submission.id, "Form submitted");
    state.publish(
        PlatformEvent::new(event_types::FORM_SUBMITTED)
            .with_source("form", form.id)
            .with_optional_actor(user_id)
            .with_payload(serde_json::json!({
                "submission_id": submission.submission.id,
                "answers": submission.answers.len(),
            })),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}

// ---------------------------------------------------------------------------
// Owner endpoints: forms
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/forms
pub async fn list_forms(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<Form>>>> {
    let forms = FormRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: forms }))
}

/// POST /api/v1/admin/forms
pub async fn create_form(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Json(input): Json<CreateForm>,
) -> AppResult<(StatusCode, Json<DataResponse<Form>>)> {
    validate_title(&input.title)?;
    validate_slug(&input.slug)?;
    let form = FormRepo::create(&state.pool, &input, owner.user_id).await?;
    tracing::info!(form_id = form.id, slug = %form.slug, "Form created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
}

/// GET /api/v1/admin/forms/{id}
pub async fn get_form(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormTree>>> {
    let form = ensure_form(&state, id).await?;
    let tree = FormRepo::tree(&state.pool, form).await?;
    Ok(Json(DataResponse { data: tree }))
}

/// PUT /api/v1/admin/forms/{id}
pub async fn update_form(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateForm>,
) -> AppResult<Json<DataResponse<Form>>> {
    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(slug) = input.slug.as_deref() {
        validate_slug(slug)?;
    }
    let form = FormRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Form", id))?;
    Ok(Json(DataResponse { data: form }))
}

/// DELETE /api/v1/admin/forms/{id}
///
/// Removes questions, submissions, and answers with it.
pub async fn delete_form(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FormRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Form", id));
    }
    tracing::info!(form_id = id, "Form deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/forms/{id}/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<SubmissionWithAnswers>>>> {
    ensure_form(&state, id).await?;
    let (limit, offset) = params.resolve();
    let submissions = FormRepo::list_submissions(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse { data: submissions }))
}

// ---------------------------------------------------------------------------
// Owner endpoints: questions
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/forms/{id}/questions
pub async fn create_question(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(form_id): Path<DbId>,
    Json(input): Json<CreateQuestion>,
) -> AppResult<(StatusCode, Json<DataResponse<QuestionWithOptions>>)> {
    validate_question(&input.question_type, &input.label, &input.options)?;
    ensure_form(&state, form_id).await?;
    let question = FormRepo::create_question(&state.pool, form_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// PUT /api/v1/admin/forms/{id}/questions/{question_id}
///
/// A supplied `options` list replaces the existing options.
pub async fn update_question(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((form_id, question_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateQuestion>,
) -> AppResult<Json<DataResponse<QuestionWithOptions>>> {
    let current = FormRepo::questions(&state.pool, form_id)
        .await?
        .into_iter()
        .find(|q| q.question.id == question_id)
        .ok_or_else(|| AppError::not_found("FormQuestion", question_id))?;

    let current_options: Vec<String> = current.options.iter().map(|o| o.label.clone()).collect();
    validate_question(
        input
            .question_type
            .as_deref()
            .unwrap_or(&current.question.question_type),
        input.label.as_deref().unwrap_or(&current.question.label),
        input.options.as_deref().unwrap_or(&current_options),
    )?;

    let question = FormRepo::update_question(&state.pool, form_id, question_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("FormQuestion", question_id))?;
    Ok(Json(DataResponse { data: question }))
}

/// DELETE /api/v1/admin/forms/{id}/questions/{question_id}
pub async fn delete_question(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((form_id, question_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !FormRepo::delete_question(&state.pool, form_id, question_id).await? {
        return Err(AppError::not_found("FormQuestion", question_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/forms/{id}/questions/order
pub async fn reorder_questions(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(form_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    ensure_form(&state, form_id).await?;
    reorder_result(FormRepo::reorder_questions(&state.pool, form_id, &input.ids).await?)
}
