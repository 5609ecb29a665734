//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::routes::{checklist, events, forms, goals, landing, store, tickets};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require an owner (enforced by handler extractors).
///
/// ```text
/// GET  /users          -> list_users
/// GET  /users/{id}     -> get_user
/// PUT  /users/{id}     -> update_user
/// GET  /dashboard      -> dashboard
/// GET  /activity       -> list_activity
/// ```
///
/// plus the owner routes of every other resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", get(admin::get_user).put(admin::update_user))
        .route("/dashboard", get(admin::dashboard))
        .route("/activity", get(admin::list_activity))
        .merge(checklist::admin_router())
        .merge(tickets::admin_router())
        .merge(goals::admin_router())
        .merge(events::admin_router())
        .merge(store::admin_router())
        .merge(landing::admin_router())
        .merge(forms::admin_router())
}
