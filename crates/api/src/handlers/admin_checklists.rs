//! Owner management of onboarding steps and dynamic checklists.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::checklist::{validate_item_title, ChecklistProgress};
use onboard_core::types::DbId;
use onboard_db::models::checklist::{
    AssignmentSummary, ChecklistAssignment, ChecklistItem, CreateAssignment,
    CreateChecklistItem, CreateDynamicChecklist, DynamicChecklist, UpdateChecklistItem,
    UpdateDynamicChecklist,
};
use onboard_db::models::onboarding_step::{
    CreateOnboardingStep, OnboardingStep, UpdateOnboardingStep,
};
use onboard_db::repositories::{ChecklistRepo, OnboardingStepRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::guards::RequireOwner;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_optional_title(title: Option<&str>) -> AppResult<()> {
    if let Some(title) = title {
        validate_item_title(title)?;
    }
    Ok(())
}

async fn ensure_checklist_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<DynamicChecklist> {
    ChecklistRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("DynamicChecklist", id))
}

// ---------------------------------------------------------------------------
// Onboarding steps
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/onboarding-steps
pub async fn list_steps(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<OnboardingStep>>>> {
    let steps = OnboardingStepRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: steps }))
}

/// POST /api/v1/admin/onboarding-steps
pub async fn create_step(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Json(input): Json<CreateOnboardingStep>,
) -> AppResult<(StatusCode, Json<DataResponse<OnboardingStep>>)> {
    validate_item_title(&input.title)?;
    let step = OnboardingStepRepo::create(&state.pool, &input).await?;
    tracing::info!(step_id = step.id, "Onboarding step created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: step })))
}

/// PUT /api/v1/admin/onboarding-steps/{id}
pub async fn update_step(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOnboardingStep>,
) -> AppResult<Json<DataResponse<OnboardingStep>>> {
    validate_optional_title(input.title.as_deref())?;
    let step = OnboardingStepRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("OnboardingStep", id))?;
    Ok(Json(DataResponse { data: step }))
}

/// DELETE /api/v1/admin/onboarding-steps/{id}
pub async fn delete_step(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !OnboardingStepRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("OnboardingStep", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dynamic checklists
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ChecklistDetail {
    #[serde(flatten)]
    pub checklist: DynamicChecklist,
    pub items: Vec<ChecklistItem>,
}

/// Assignment row with its completion percentage.
#[derive(Debug, Serialize)]
pub struct AssignmentProgress {
    #[serde(flatten)]
    pub assignment: AssignmentSummary,
    pub progress: ChecklistProgress,
}

/// GET /api/v1/admin/checklists
pub async fn list_checklists(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<DynamicChecklist>>>> {
    let checklists = ChecklistRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: checklists }))
}

/// POST /api/v1/admin/checklists
pub async fn create_checklist(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Json(input): Json<CreateDynamicChecklist>,
) -> AppResult<(StatusCode, Json<DataResponse<DynamicChecklist>>)> {
    validate_item_title(&input.title)?;
    let checklist = ChecklistRepo::create(&state.pool, &input, owner.user_id).await?;
    tracing::info!(checklist_id = checklist.id, "Checklist created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: checklist })))
}

/// GET /api/v1/admin/checklists/{id}
pub async fn get_checklist(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChecklistDetail>>> {
    let checklist = ensure_checklist_exists(&state.pool, id).await?;
    let items = ChecklistRepo::list_items(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ChecklistDetail { checklist, items },
    }))
}

/// PUT /api/v1/admin/checklists/{id}
pub async fn update_checklist(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDynamicChecklist>,
) -> AppResult<Json<DataResponse<DynamicChecklist>>> {
    validate_optional_title(input.title.as_deref())?;
    let checklist = ChecklistRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("DynamicChecklist", id))?;
    Ok(Json(DataResponse { data: checklist }))
}

/// DELETE /api/v1/admin/checklists/{id}
///
/// Cascades to items, assignments, and progress.
pub async fn delete_checklist(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ChecklistRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("DynamicChecklist", id));
    }
    tracing::info!(checklist_id = id, "Checklist deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/checklists/{id}/items
pub async fn create_item(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(checklist_id): Path<DbId>,
    Json(input): Json<CreateChecklistItem>,
) -> AppResult<(StatusCode, Json<DataResponse<ChecklistItem>>)> {
    validate_item_title(&input.title)?;
    ensure_checklist_exists(&state.pool, checklist_id).await?;
    let item = ChecklistRepo::create_item(&state.pool, checklist_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/admin/checklists/{id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((checklist_id, item_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateChecklistItem>,
) -> AppResult<Json<DataResponse<ChecklistItem>>> {
    validate_optional_title(input.title.as_deref())?;
    let item = ChecklistRepo::update_item(&state.pool, checklist_id, item_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("ChecklistItem", item_id))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/admin/checklists/{id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((checklist_id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ChecklistRepo::delete_item(&state.pool, checklist_id, item_id).await? {
        return Err(AppError::not_found("ChecklistItem", item_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/checklists/{id}/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(checklist_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssignmentProgress>>>> {
    ensure_checklist_exists(&state.pool, checklist_id).await?;
    let assignments = ChecklistRepo::list_assignments(&state.pool, checklist_id)
        .await?
        .into_iter()
        .map(|assignment| AssignmentProgress {
            progress: ChecklistProgress::new(assignment.completed_items, assignment.total_items),
            assignment,
        })
        .collect();
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/admin/checklists/{id}/assignments
///
/// A user can hold one assignment per checklist (409 on repeat).
pub async fn assign(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(checklist_id): Path<DbId>,
    Json(input): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<ChecklistAssignment>>)> {
    ensure_checklist_exists(&state.pool, checklist_id).await?;
    let assignment = ChecklistRepo::assign(&state.pool, checklist_id, &input, owner.user_id).await?;
    tracing::info!(
        checklist_id,
        user_id = input.user_id,
        assignment_id = assignment.id,
        "Checklist assigned"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// DELETE /api/v1/admin/checklists/{id}/assignments/{assignment_id}
pub async fn unassign(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((checklist_id, assignment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ChecklistRepo::unassign(&state.pool, checklist_id, assignment_id).await? {
        return Err(AppError::not_found("ChecklistAssignment", assignment_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
