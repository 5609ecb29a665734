//! Route definitions for company events.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Public routes mounted at `/events`.
///
/// ```text
/// GET  /                       -> list_published
/// GET  /{id}                   -> get_published
/// POST /{id}/registrations     -> register (optional auth)
/// GET  /tickets/{reference}    -> get_ticket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_published))
        .route("/{id}", get(events::get_published))
        .route("/{id}/registrations", post(events::register))
        .route("/tickets/{reference}", get(events::get_ticket))
}

/// Owner routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{id}/participants", get(events::list_participants))
        .route("/events/{id}/check-in", post(events::check_in))
}
