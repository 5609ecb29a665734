//! Monthly performance goals.
//!
//! Every response carries the computed completion `percentage`, which is not
//! clamped: over-achievement reports more than 100.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::performance::{
    calculate_performance_percentage, checklist_completion, current_month_year,
    validate_goal_checklist, validate_goal_values, validate_month_year, GoalChecklistItem,
};
use onboard_core::types::DbId;
use onboard_db::models::performance_goal::{CreateGoal, GoalFilter, PerformanceGoal, UpdateGoal};
use onboard_db::repositories::PerformanceGoalRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::guards::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: PerformanceGoal,
    pub percentage: f64,
    /// Share of the embedded checklist marked done, as a percentage.
    pub checklist_completion: f64,
}

impl From<PerformanceGoal> for GoalResponse {
    fn from(goal: PerformanceGoal) -> Self {
        let percentage = calculate_performance_percentage(
            goal.completed_hours,
            goal.target_hours,
            goal.completed_story_points,
            goal.target_story_points,
        );
        let items: Vec<GoalChecklistItem> =
            serde_json::from_value(goal.checklist.clone()).unwrap_or_default();
        Self {
            checklist_completion: checklist_completion(&items),
            percentage,
            goal,
        }
    }
}

/// `?month_year=YYYY-MM` on the user listing.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month_year: Option<String>,
}

fn validate_filter_month(month_year: Option<&str>) -> AppResult<()> {
    if let Some(month) = month_year {
        validate_month_year(month)?;
    }
    Ok(())
}

fn respond(goals: Vec<PerformanceGoal>) -> Json<DataResponse<Vec<GoalResponse>>> {
    Json(DataResponse {
        data: goals.into_iter().map(GoalResponse::from).collect(),
    })
}

// ---------------------------------------------------------------------------
// User endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/goals
pub async fn list_own_goals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<DataResponse<Vec<GoalResponse>>>> {
    validate_filter_month(params.month_year.as_deref())?;
    let filter = GoalFilter {
        user_id: Some(auth.user_id),
        month_year: params.month_year,
    };
    let goals = PerformanceGoalRepo::list(&state.pool, &filter).await?;
    Ok(respond(goals))
}

/// GET /api/v1/goals/current
///
/// `data` is `null` when no goal has been set for this month.
pub async fn current_goal(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Option<GoalResponse>>>> {
    let filter = GoalFilter {
        user_id: Some(auth.user_id),
        month_year: Some(current_month_year()),
    };
    let goal = PerformanceGoalRepo::list(&state.pool, &filter)
        .await?
        .into_iter()
        .next()
        .map(GoalResponse::from);
    Ok(Json(DataResponse { data: goal }))
}

// ---------------------------------------------------------------------------
// Owner endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/goals
pub async fn list_goals(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(filter): Query<GoalFilter>,
) -> AppResult<Json<DataResponse<Vec<GoalResponse>>>> {
    validate_filter_month(filter.month_year.as_deref())?;
    let goals = PerformanceGoalRepo::list(&state.pool, &filter).await?;
    Ok(respond(goals))
}

/// GET /api/v1/admin/goals/{id}
pub async fn get_goal(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GoalResponse>>> {
    let goal = PerformanceGoalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PerformanceGoal", id))?;
    Ok(Json(DataResponse { data: goal.into() }))
}

/// POST /api/v1/admin/goals
///
/// One goal per user and month; a second one answers 409.
pub async fn create_goal(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Json(input): Json<CreateGoal>,
) -> AppResult<(StatusCode, Json<DataResponse<GoalResponse>>)> {
    validate_month_year(&input.month_year)?;
    validate_goal_values(&[
        ("target_hours", input.target_hours),
        ("completed_hours", input.completed_hours),
        ("target_story_points", input.target_story_points),
        ("completed_story_points", input.completed_story_points),
    ])?;
    validate_goal_checklist(&input.checklist)?;

    let goal = PerformanceGoalRepo::create(&state.pool, &input).await?;
    tracing::info!(goal_id = goal.id, user_id = goal.user_id, month = %goal.month_year, "Goal created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: goal.into() })))
}

/// PUT /api/v1/admin/goals/{id}
pub async fn update_goal(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGoal>,
) -> AppResult<Json<DataResponse<GoalResponse>>> {
    let values: Vec<(&str, f64)> = [
        ("target_hours", input.target_hours),
        ("completed_hours", input.completed_hours),
        ("target_story_points", input.target_story_points),
        ("completed_story_points", input.completed_story_points),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name, v)))
    .collect();
    validate_goal_values(&values)?;
    if let Some(checklist) = input.checklist.as_deref() {
        validate_goal_checklist(checklist)?;
    }

    let goal = PerformanceGoalRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("PerformanceGoal", id))?;
    Ok(Json(DataResponse { data: goal.into() }))
}

/// DELETE /api/v1/admin/goals/{id}
pub async fn delete_goal(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PerformanceGoalRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("PerformanceGoal", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
