//! Route definitions for checklists: the user's own at `/checklist`, owner
//! management under `/admin`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin_checklists, checklist};
use crate::state::AppState;

/// Routes mounted at `/checklist`.
///
/// ```text
/// GET /steps                                           -> list_steps
/// PUT /steps/{step_id}                                 -> toggle_step
/// GET /assignments                                     -> list_assignments
/// PUT /assignments/{assignment_id}/items/{item_id}     -> toggle_assignment_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/steps", get(checklist::list_steps))
        .route("/steps/{step_id}", put(checklist::toggle_step))
        .route("/assignments", get(checklist::list_assignments))
        .route(
            "/assignments/{assignment_id}/items/{item_id}",
            put(checklist::toggle_assignment_item),
        )
}

/// Owner routes, merged into `/admin`.
///
/// ```text
/// GET, POST       /onboarding-steps
/// PUT, DELETE     /onboarding-steps/{id}
/// GET, POST       /checklists
/// GET, PUT, DEL   /checklists/{id}
/// POST            /checklists/{id}/items
/// PUT, DELETE     /checklists/{id}/items/{item_id}
/// GET, POST       /checklists/{id}/assignments
/// DELETE          /checklists/{id}/assignments/{assignment_id}
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/onboarding-steps",
            get(admin_checklists::list_steps).post(admin_checklists::create_step),
        )
        .route(
            "/onboarding-steps/{id}",
            put(admin_checklists::update_step).delete(admin_checklists::delete_step),
        )
        .route(
            "/checklists",
            get(admin_checklists::list_checklists).post(admin_checklists::create_checklist),
        )
        .route(
            "/checklists/{id}",
            get(admin_checklists::get_checklist)
                .put(admin_checklists::update_checklist)
                .delete(admin_checklists::delete_checklist),
        )
        .route("/checklists/{id}/items", post(admin_checklists::create_item))
        .route(
            "/checklists/{id}/items/{item_id}",
            put(admin_checklists::update_item).delete(admin_checklists::delete_item),
        )
        .route(
            "/checklists/{id}/assignments",
            get(admin_checklists::list_assignments).post(admin_checklists::assign),
        )
        .route(
            "/checklists/{id}/assignments/{assignment_id}",
            delete(admin_checklists::unassign),
        )
}
