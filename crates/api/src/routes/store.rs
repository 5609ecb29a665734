//! Route definitions for the points store.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::store;
use crate::state::AppState;

/// Routes mounted at `/store`. Require store access.
///
/// ```text
/// GET  /products                -> list_products
/// POST /products/{id}/redeem    -> redeem
/// GET  /transactions            -> list_own_transactions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(store::list_products))
        .route("/products/{id}/redeem", post(store::redeem))
        .route("/transactions", get(store::list_own_transactions))
}

/// Owner routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/store/products",
            get(store::admin_list_products).post(store::create_product),
        )
        .route(
            "/store/products/{id}",
            get(store::get_product)
                .put(store::update_product)
                .delete(store::delete_product),
        )
        .route("/store/transactions", get(store::list_transactions))
        .route(
            "/users/{id}/points",
            get(store::list_adjustments).post(store::adjust_points),
        )
}
