pub mod admin;
pub mod auth;
pub mod checklist;
pub mod events;
pub mod forms;
pub mod goals;
pub mod health;
pub mod landing;
pub mod profile;
pub mod store;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/github/authorize                 GitHub authorize URL (public)
/// /auth/github/callback                  code exchange, sign-in (public)
/// /auth/refresh                          rotate refresh token (public)
/// /auth/logout, /auth/me                 (requires auth)
///
/// /profile, /profile/bio                 wizard data
/// /profile/email/otp, /email/verify      company email verification
/// /profile/wizard[/complete]             wizard progress and completion
///
/// /checklist/steps[/{id}]                onboarding steps
/// /checklist/assignments/...             assigned dynamic checklists
/// /tickets[/{id}]                        own support tickets
/// /goals, /goals/current                 own performance goals
/// /store/...                             points store (store access)
///
/// /events[/{id}]                         published events (public)
/// /events/{id}/registrations             register (public, optional auth)
/// /events/tickets/{reference}            registration ticket (public)
/// /landing                               active landing page (public)
/// /forms/{slug}[/submissions]            published forms (public)
///
/// /admin/...                             owner management (owner only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/checklist", checklist::router())
        .nest("/tickets", tickets::router())
        .nest("/goals", goals::router())
        .nest("/store", store::router())
        .nest("/events", events::router())
        .nest("/landing", landing::router())
        .nest("/forms", forms::router())
        .nest("/admin", admin::router())
}
