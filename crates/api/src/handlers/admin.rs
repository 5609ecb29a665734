//! Handlers for the `/admin` user directory, dashboard, and activity feed.
//!
//! All handlers require an owner via [`RequireOwner`].

use axum::extract::{Path, Query, State};
use axum::Json;
use onboard_core::profile::validate_optional_text;
use onboard_core::types::DbId;
use onboard_db::models::activity::ActivityEntry;
use onboard_db::models::dashboard::DashboardSummary;
use onboard_db::models::user::{UpdateUserFlags, UserResponse};
use onboard_db::repositories::{ActivityRepo, DashboardRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::guards::RequireOwner;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Entries shown on a user's detail page.
const RECENT_ACTIVITY_LIMIT: i64 = 20;

/// Query parameters for `GET /admin/activity`.
#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: UserResponse,
    pub recent_activity: Vec<ActivityEntry>,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserDetail>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    let recent_activity = ActivityRepo::list_for_actor(&state.pool, id, RECENT_ACTIVITY_LIMIT).await?;
    Ok(Json(DataResponse {
        data: UserDetail {
            user: UserResponse::from(&user),
            recent_activity,
        },
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Grants or revokes owner and store access, or moves a user between
/// departments. Takes effect on the user's next request.
pub async fn update_user(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserFlags>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_optional_text(input.department.as_deref(), "Department")?;
    let user = UserRepo::update_flags(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(
        user_id = id,
        updated_by = owner.user_id,
        is_owner = user.is_owner,
        store_access = user.store_access,
        "User flags updated"
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let summary = DashboardRepo::summary(&state.pool).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/admin/activity
pub async fn list_activity(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<ActivityParams>,
) -> AppResult<Json<DataResponse<Vec<ActivityEntry>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let entries =
        ActivityRepo::list_recent(&state.pool, params.event_type.as_deref(), limit, offset).await?;
    Ok(Json(DataResponse { data: entries }))
}
