//! Handlers for the signed-in user's checklists.
//!
//! Two kinds: the static onboarding steps every user works through, and
//! dynamic checklists an owner assigns to specific users.

use axum::extract::{Path, State};
use axum::Json;
use onboard_core::checklist::ChecklistProgress;
use onboard_core::types::DbId;
use onboard_db::models::checklist::{AssignmentItemStatus, AssignmentSummary};
use onboard_db::models::onboarding_step::UserStepStatus;
use onboard_db::repositories::{ChecklistRepo, OnboardingStepRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the completion toggles.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct StepOverview {
    pub steps: Vec<UserStepStatus>,
    pub progress: ChecklistProgress,
}

/// One assigned checklist with the user's per-item state.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: AssignmentSummary,
    pub progress: ChecklistProgress,
    pub items: Vec<AssignmentItemStatus>,
}

async fn step_overview(state: &AppState, user_id: DbId) -> AppResult<StepOverview> {
    let steps = OnboardingStepRepo::list_for_user(&state.pool, user_id).await?;
    let completed = steps.iter().filter(|s| s.completed).count() as i64;
    let progress = ChecklistProgress::new(completed, steps.len() as i64);
    Ok(StepOverview { steps, progress })
}

/// GET /api/v1/checklist/steps
pub async fn list_steps(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<StepOverview>>> {
    let overview = step_overview(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: overview }))
}

/// PUT /api/v1/checklist/steps/{step_id}
pub async fn toggle_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step_id): Path<DbId>,
    Json(input): Json<ToggleRequest>,
) -> AppResult<Json<DataResponse<StepOverview>>> {
    let step = OnboardingStepRepo::find_by_id(&state.pool, step_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::not_found("OnboardingStep", step_id))?;

    OnboardingStepRepo::set_completed(&state.pool, auth.user_id, step.id, input.completed).await?;
    tracing::debug!(user_id = auth.user_id, step_id, completed = input.completed, "Step toggled");

    let overview = step_overview(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: overview }))
}

async fn assignment_view(state: &AppState, summary: AssignmentSummary) -> AppResult<AssignmentView> {
    let items = ChecklistRepo::assignment_items(&state.pool, summary.id).await?;
    Ok(AssignmentView {
        progress: ChecklistProgress::new(summary.completed_items, summary.total_items),
        assignment: summary,
        items,
    })
}

/// GET /api/v1/checklist/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    let summaries = ChecklistRepo::list_assignments_for_user(&state.pool, auth.user_id).await?;
    let mut views = Vec::with_capacity(summaries.len());
    for summary in summaries {
        views.push(assignment_view(&state, summary).await?);
    }
    Ok(Json(DataResponse { data: views }))
}

/// PUT /api/v1/checklist/assignments/{assignment_id}/items/{item_id}
///
/// Assignments of other users answer 404 rather than 403.
pub async fn toggle_assignment_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((assignment_id, item_id)): Path<(DbId, DbId)>,
    Json(input): Json<ToggleRequest>,
) -> AppResult<Json<DataResponse<AssignmentView>>> {
    ChecklistRepo::find_assignment(&state.pool, assignment_id)
        .await?
        .filter(|a| a.user_id == auth.user_id)
        .ok_or_else(|| AppError::not_found("ChecklistAssignment", assignment_id))?;

    if !ChecklistRepo::set_item_completed(&state.pool, assignment_id, item_id, input.completed)
        .await?
    {
        return Err(AppError::not_found("ChecklistItem", item_id));
    }

    let summary = ChecklistRepo::list_assignments_for_user(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .find(|s| s.id == assignment_id)
        .ok_or_else(|| AppError::not_found("ChecklistAssignment", assignment_id))?;
    let view = assignment_view(&state, summary).await?;
    Ok(Json(DataResponse { data: view }))
}
