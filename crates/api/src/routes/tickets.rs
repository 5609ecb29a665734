//! Route definitions for support tickets.

use axum::routing::get;
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET, POST  /       -> list_own_tickets, create_ticket
/// GET        /{id}   -> get_own_ticket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_own_tickets).post(tickets::create_ticket))
        .route("/{id}", get(tickets::get_own_ticket))
}

/// Owner routes, merged into `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(tickets::list_tickets))
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
}
