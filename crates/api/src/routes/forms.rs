//! Route definitions for the forms builder.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// Public routes mounted at `/forms`.
///
/// ```text
/// GET  /{slug}               -> get_published
/// POST /{slug}/submissions   -> submit (optional auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(forms::get_published))
        .route("/{slug}/submissions", post(forms::submit))
}

/// Owner routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/forms", get(forms::list_forms).post(forms::create_form))
        .route(
            "/forms/{id}",
            get(forms::get_form)
                .put(forms::update_form)
                .delete(forms::delete_form),
        )
        .route("/forms/{id}/submissions", get(forms::list_submissions))
        .route("/forms/{id}/questions", post(forms::create_question))
        .route("/forms/{id}/questions/order", put(forms::reorder_questions))
        .route(
            "/forms/{id}/questions/{question_id}",
            put(forms::update_question).delete(forms::delete_question),
        )
}
