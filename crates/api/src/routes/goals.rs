//! Route definitions for performance goals.

use axum::routing::get;
use axum::Router;

use crate::handlers::goals;
use crate::state::AppState;

/// Routes mounted at `/goals`.
///
/// ```text
/// GET /          -> list_own_goals (?month_year=)
/// GET /current   -> current_goal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(goals::list_own_goals))
        .route("/current", get(goals::current_goal))
}

/// Owner routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/goals/{id}",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
}
