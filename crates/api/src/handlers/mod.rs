//! Request handlers, one module per resource.
//!
//! Handlers validate input with `onboard_core`, delegate persistence to the
//! repositories in `onboard_db`, and map failures through [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod admin_checklists;
pub mod auth;
pub mod checklist;
pub mod events;
pub mod forms;
pub mod goals;
pub mod landing;
pub mod profile;
pub mod store;
pub mod tickets;
pub mod verification;
