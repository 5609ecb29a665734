//! Landing page builder: pages hold ordered sections, sections hold ordered
//! components. Exactly one page can be active and served publicly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::landing::{
    validate_block_content, validate_component_type, validate_section_type, validate_slug,
    validate_title,
};
use onboard_core::types::DbId;
use onboard_db::models::landing::{
    CreateComponent, CreateLandingPage, CreateSection, LandingComponent, LandingPage,
    LandingPageTree, LandingSection, UpdateComponent, UpdateLandingPage, UpdateSection,
};
use onboard_db::repositories::{LandingRepo, ReorderOutcome};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::guards::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the reorder endpoints: every child id, in the new order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<DbId>,
}

pub(crate) fn reorder_result(outcome: ReorderOutcome) -> AppResult<StatusCode> {
    match outcome {
        ReorderOutcome::Reordered => Ok(StatusCode::NO_CONTENT),
        ReorderOutcome::Rejected(rejection) => Err(AppError::Core(rejection)),
    }
}

async fn ensure_page(state: &AppState, page_id: DbId) -> AppResult<LandingPage> {
    LandingRepo::find_page(&state.pool, page_id)
        .await?
        .ok_or_else(|| AppError::not_found("LandingPage", page_id))
}

async fn ensure_section(
    state: &AppState,
    page_id: DbId,
    section_id: DbId,
) -> AppResult<LandingSection> {
    LandingRepo::find_section(&state.pool, page_id, section_id)
        .await?
        .ok_or_else(|| AppError::not_found("LandingSection", section_id))
}

/// GET /api/v1/landing
///
/// The active page with its visible sections, 404 when no page is active.
pub async fn get_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<LandingPageTree>>> {
    let tree = LandingRepo::active_tree(&state.pool)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/landing/pages
pub async fn list_pages(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<LandingPage>>>> {
    let pages = LandingRepo::list_pages(&state.pool).await?;
    Ok(Json(DataResponse { data: pages }))
}

/// POST /api/v1/admin/landing/pages
pub async fn create_page(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Json(input): Json<CreateLandingPage>,
) -> AppResult<(StatusCode, Json<DataResponse<LandingPage>>)> {
    validate_title(&input.title)?;
    validate_slug(&input.slug)?;
    let page = LandingRepo::create_page(&state.pool, &input).await?;
    tracing::info!(page_id = page.id, slug = %page.slug, "Landing page created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

/// GET /api/v1/admin/landing/pages/{id}
///
/// Full tree including hidden sections.
pub async fn get_page(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LandingPageTree>>> {
    let tree = LandingRepo::page_tree(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("LandingPage", id))?;
    Ok(Json(DataResponse { data: tree }))
}

/// PUT /api/v1/admin/landing/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLandingPage>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(slug) = input.slug.as_deref() {
        validate_slug(slug)?;
    }
    let page = LandingRepo::update_page(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("LandingPage", id))?;
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/v1/admin/landing/pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !LandingRepo::delete_page(&state.pool, id).await? {
        return Err(AppError::not_found("LandingPage", id));
    }
    tracing::info!(page_id = id, "Landing page deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/landing/pages/{id}/activate
///
/// Deactivates every other page. Activating the active page again is a no-op.
pub async fn activate_page(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    let page = LandingRepo::set_active(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("LandingPage", id))?;

    tracing::info!(page_id = id, "Landing page activated");
    state.publish(
        PlatformEvent::new(event_types::LANDING_ACTIVATED)
            .with_source("landing_page", id)
            .with_actor(owner.user_id)
            .with_payload(serde_json::json!({ "slug": page.slug })),
    );
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/admin/landing/pages/{id}/deactivate
pub async fn deactivate_page(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LandingPage>>> {
    let page = LandingRepo::deactivate(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("LandingPage", id))?;
    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/landing/pages/{id}/sections
///
/// New sections are appended after the last one.
pub async fn create_section(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(page_id): Path<DbId>,
    Json(input): Json<CreateSection>,
) -> AppResult<(StatusCode, Json<DataResponse<LandingSection>>)> {
    validate_section_type(&input.section_type)?;
    validate_block_content(Some(&input.section_type), &input.content)?;
    ensure_page(&state, page_id).await?;

    let section = LandingRepo::create_section(&state.pool, page_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// PUT /api/v1/admin/landing/pages/{id}/sections/{section_id}
pub async fn update_section(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSection>,
) -> AppResult<Json<DataResponse<LandingSection>>> {
    let current = ensure_section(&state, page_id, section_id).await?;
    let section_type = input.section_type.as_deref().unwrap_or(&current.section_type);
    validate_section_type(section_type)?;
    validate_block_content(
        Some(section_type),
        input.content.as_ref().unwrap_or(&current.content),
    )?;

    let section = LandingRepo::update_section(&state.pool, page_id, section_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("LandingSection", section_id))?;
    Ok(Json(DataResponse { data: section }))
}

/// DELETE /api/v1/admin/landing/pages/{id}/sections/{section_id}
pub async fn delete_section(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !LandingRepo::delete_section(&state.pool, page_id, section_id).await? {
        return Err(AppError::not_found("LandingSection", section_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/landing/pages/{id}/sections/order
pub async fn reorder_sections(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(page_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    ensure_page(&state, page_id).await?;
    reorder_result(LandingRepo::reorder_sections(&state.pool, page_id, &input.ids).await?)
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/landing/pages/{id}/sections/{section_id}/components
pub async fn create_component(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateComponent>,
) -> AppResult<(StatusCode, Json<DataResponse<LandingComponent>>)> {
    validate_component_type(&input.component_type)?;
    validate_block_content(None, &input.content)?;
    ensure_section(&state, page_id, section_id).await?;

    let component = LandingRepo::create_component(&state.pool, section_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: component })))
}

/// PUT /api/v1/admin/landing/pages/{id}/sections/{section_id}/components/{component_id}
pub async fn update_component(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id, component_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateComponent>,
) -> AppResult<Json<DataResponse<LandingComponent>>> {
    if let Some(component_type) = input.component_type.as_deref() {
        validate_component_type(component_type)?;
    }
    if let Some(content) = input.content.as_ref() {
        validate_block_content(None, content)?;
    }
    ensure_section(&state, page_id, section_id).await?;

    let component = LandingRepo::update_component(&state.pool, section_id, component_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("LandingComponent", component_id))?;
    Ok(Json(DataResponse { data: component }))
}

/// DELETE /api/v1/admin/landing/pages/{id}/sections/{section_id}/components/{component_id}
pub async fn delete_component(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id, component_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_section(&state, page_id, section_id).await?;
    if !LandingRepo::delete_component(&state.pool, section_id, component_id).await? {
        return Err(AppError::not_found("LandingComponent", component_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/landing/pages/{id}/sections/{section_id}/components/order
pub async fn reorder_components(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path((page_id, section_id)): Path<(DbId, DbId)>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    ensure_section(&state, page_id, section_id).await?;
    reorder_result(LandingRepo::reorder_components(&state.pool, section_id, &input.ids).await?)
}
