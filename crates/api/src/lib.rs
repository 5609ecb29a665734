//! HTTP API of the onboarding portal. The binary in `main.rs` wires real
//! integrations into [`state::AppState`]; integration tests build the same
//! router with stubs.

pub mod auth;
pub mod background;
pub mod captcha;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
