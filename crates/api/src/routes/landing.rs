//! Route definitions for the landing page builder.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::landing;
use crate::state::AppState;

/// Public route mounted at `/landing`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(landing::get_active))
}

/// Owner routes, merged into `/admin`.
///
/// ```text
/// GET, POST       /landing/pages
/// GET, PUT, DEL   /landing/pages/{id}
/// POST            /landing/pages/{id}/activate
/// POST            /landing/pages/{id}/deactivate
/// POST            /landing/pages/{id}/sections
/// PUT             /landing/pages/{id}/sections/order
/// PUT, DELETE     /landing/pages/{id}/sections/{section_id}
/// POST            /landing/pages/{id}/sections/{section_id}/components
/// PUT             /landing/pages/{id}/sections/{section_id}/components/order
/// PUT, DELETE     /landing/pages/{id}/sections/{section_id}/components/{component_id}
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/landing/pages",
            get(landing::list_pages).post(landing::create_page),
        )
        .route(
            "/landing/pages/{id}",
            get(landing::get_page)
                .put(landing::update_page)
                .delete(landing::delete_page),
        )
        .route("/landing/pages/{id}/activate", post(landing::activate_page))
        .route("/landing/pages/{id}/deactivate", post(landing::deactivate_page))
        .route("/landing/pages/{id}/sections", post(landing::create_section))
        .route(
            "/landing/pages/{id}/sections/order",
            put(landing::reorder_sections),
        )
        .route(
            "/landing/pages/{id}/sections/{section_id}",
            put(landing::update_section).delete(landing::delete_section),
        )
        .route(
            "/landing/pages/{id}/sections/{section_id}/components",
            post(landing::create_component),
        )
        .route(
            "/landing/pages/{id}/sections/{section_id}/components/order",
            put(landing::reorder_components),
        )
        .route(
            "/landing/pages/{id}/sections/{section_id}/components/{component_id}",
            put(landing::update_component).delete(landing::delete_component),
        )
}
