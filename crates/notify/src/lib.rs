//! Activity bus and outbound mail for the onboarding portal.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the activity envelope published by handlers.
//! - [`ActivityPersistence`] -- background service writing every event to
//!   the `activity_log` table.
//! - [`delivery`] -- outbound email behind the [`Mailer`] trait.

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{
    EmailConfig, EmailError, LogMailer, Mailer, SmtpMailer, SmtpSecurity, VerificationMail,
};
pub use persistence::ActivityPersistence;
