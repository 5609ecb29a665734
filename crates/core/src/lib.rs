//! Domain rules for the onboarding portal.
//!
//! Everything in this crate is pure: validation, derived values, and small
//! generators. Persistence lives in `onboard-db`; HTTP lives in `onboard-api`.

pub mod checklist;
pub mod company_events;
pub mod error;
pub mod forms;
pub mod hashing;
pub mod landing;
pub mod ordering;
pub mod otp;
pub mod pagination;
pub mod performance;
pub mod profile;
pub mod store;
pub mod tickets;
pub mod types;
