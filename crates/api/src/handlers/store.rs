//! Points store. Shopping needs the `store_access` flag; management is
//! owner-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use onboard_core::error::CoreError;
use onboard_core::store::validate_product;
use onboard_core::types::DbId;
use onboard_db::models::store::{
    CreateProduct, PointAdjustment, Redemption, StoreProduct, StoreTransaction, UpdateProduct,
};
use onboard_db::repositories::{AdjustOutcome, RedeemOutcome, StoreRepo};
use onboard_notify::bus::event_types;
use onboard_notify::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::guards::{RequireOwner, RequireStoreAccess};
use crate::query::{IncludeInactiveParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users/{id}/points`.
#[derive(Debug, Deserialize)]
pub struct AdjustPointsRequest {
    pub delta: i32,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct AdjustmentResult {
    pub adjustment: PointAdjustment,
    pub balance: i32,
}

// ---------------------------------------------------------------------------
// Shopper endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/store/products
pub async fn list_products(
    State(state): State<AppState>,
    RequireStoreAccess(_auth): RequireStoreAccess,
) -> AppResult<Json<DataResponse<Vec<StoreProduct>>>> {
    let products = StoreRepo::list_products(&state.pool, false).await?;
    Ok(Json(DataResponse { data: products }))
}

/// POST /api/v1/store/products/{id}/redeem
///
/// Inactive products and insufficient balances answer 400, empty stock 409.
pub async fn redeem(
    State(state): State<AppState>,
    RequireStoreAccess(auth): RequireStoreAccess,
    Path(product_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Redemption>>)> {
    let redemption = match StoreRepo::redeem(&state.pool, auth.user_id, product_id).await? {
        RedeemOutcome::Redeemed(redemption) => redemption,
        RedeemOutcome::Rejected(rejection) => {
            tracing::info!(user_id = auth.user_id, product_id, reason = %rejection, "Redemption rejected");
            return Err(AppError::Core(rejection));
        }
        RedeemOutcome::ProductNotFound => {
            return Err(AppError::not_found("StoreProduct", product_id))
        }
        RedeemOutcome::UserNotFound => {
            return Err(AppError::unauthorized("User no longer exists"))
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        product_id,
        points_spent = redemption.transaction.points_spent,
        "Product redeemed"
    );
    state.publish(
        PlatformEvent::new(event_types::STORE_REDEEMED)
            .with_source("store_product", product_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "transaction_id": redemption.transaction.id,
                "points_spent": redemption.transaction.points_spent,
                "remaining_stock": redemption.remaining_stock,
            })),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: redemption })))
}

/// GET /api/v1/store/transactions
pub async fn list_own_transactions(
    State(state): State<AppState>,
    RequireStoreAccess(auth): RequireStoreAccess,
) -> AppResult<Json<DataResponse<Vec<StoreTransaction>>>> {
    let transactions = StoreRepo::list_transactions_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: transactions }))
}

// ---------------------------------------------------------------------------
// Owner endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/store/products
pub async fn admin_list_products(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<StoreProduct>>>> {
    let products = StoreRepo::list_products(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: products }))
}

/// POST /api/v1/admin/store/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<StoreProduct>>)> {
    validate_product(&input.name, input.point_cost, input.stock)?;
    let product = StoreRepo::create_product(&state.pool, &input).await?;
    tracing::info!(product_id = product.id, "Store product created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/v1/admin/store/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StoreProduct>>> {
    let product = StoreRepo::find_product(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("StoreProduct", id))?;
    Ok(Json(DataResponse { data: product }))
}

/// PUT /api/v1/admin/store/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<StoreProduct>>> {
    let current = StoreRepo::find_product(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("StoreProduct", id))?;
    validate_product(
        input.name.as_deref().unwrap_or(&current.name),
        input.point_cost.unwrap_or(current.point_cost),
        input.stock.unwrap_or(current.stock),
    )?;

    let product = StoreRepo::update_product(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("StoreProduct", id))?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/admin/store/products/{id}
///
/// Past transactions keep the product name.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StoreRepo::delete_product(&state.pool, id).await? {
        return Err(AppError::not_found("StoreProduct", id));
    }
    tracing::info!(product_id = id, "Store product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/store/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<StoreTransaction>>>> {
    let (limit, offset) = params.resolve();
    let transactions = StoreRepo::list_transactions(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// POST /api/v1/admin/users/{id}/points
///
/// Zero, oversized, and overdrawing deltas are rejected with 400; balances
/// never go below zero.
pub async fn adjust_points(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(user_id): Path<DbId>,
    Json(input): Json<AdjustPointsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AdjustmentResult>>)> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required for point adjustments".to_string(),
        )));
    }

    let outcome =
        StoreRepo::adjust_points(&state.pool, user_id, input.delta, &input.reason, owner.user_id)
            .await?;
    let (adjustment, balance) = match outcome {
        AdjustOutcome::Adjusted(adjustment, balance) => (adjustment, balance),
        AdjustOutcome::Rejected(rejection) => return Err(AppError::Core(rejection)),
        AdjustOutcome::UserNotFound => return Err(AppError::not_found("User", user_id)),
    };

    tracing::info!(user_id, delta = input.delta, balance, "Points adjusted");
    state.publish(
        PlatformEvent::new(event_types::POINTS_ADJUSTED)
            .with_source("user", user_id)
            .with_actor(owner.user_id)
            .with_payload(serde_json::json!({
                "delta": adjustment.delta,
                "reason": adjustment.reason,
                "balance": balance,
            })),
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AdjustmentResult {
                adjustment,
                balance,
            },
        }),
    ))
}

/// GET /api/v1/admin/users/{id}/points
pub async fn list_adjustments(
    State(state): State<AppState>,
    RequireOwner(_owner): RequireOwner,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PointAdjustment>>>> {
    let adjustments = StoreRepo::list_adjustments_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: adjustments }))
}
