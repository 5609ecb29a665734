//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET  /github/authorize  -> github_authorize
/// POST /github/callback   -> github_callback
/// POST /refresh           -> refresh
/// POST /logout            -> logout (requires auth)
/// GET  /me                -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/github/authorize", get(auth::github_authorize))
        .route("/github/callback", post(auth::github_callback))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
