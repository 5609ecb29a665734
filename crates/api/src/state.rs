use std::sync::Arc;

use onboard_notify::{EventBus, Mailer, PlatformEvent};

use crate::auth::github::IdentityProvider;
use crate::captcha::CaptchaVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: onboard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Activity bus; handlers publish after their write has committed.
    pub event_bus: Arc<EventBus>,
    /// GitHub sign-in, swapped for a stub in tests.
    pub identity: Arc<dyn IdentityProvider>,
    /// Outbound verification mail.
    pub mailer: Arc<dyn Mailer>,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl AppState {
    pub fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }
}
