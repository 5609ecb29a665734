//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod activity;
pub mod checklist;
pub mod dashboard;
pub mod event;
pub mod form;
pub mod landing;
pub mod onboarding_step;
pub mod performance_goal;
pub mod session;
pub mod store;
pub mod ticket;
pub mod user;
