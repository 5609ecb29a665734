//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row invariants
//! (points, stock, capacity, ordering) are enforced inside transactions and
//! reported through outcome enums rather than errors.

pub mod activity_repo;
pub mod checklist_repo;
pub mod dashboard_repo;
pub mod event_repo;
pub mod form_repo;
pub mod landing_repo;
pub mod onboarding_step_repo;
pub mod ordering;
pub mod performance_goal_repo;
pub mod session_repo;
pub mod store_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use checklist_repo::ChecklistRepo;
pub use dashboard_repo::DashboardRepo;
pub use event_repo::{CheckInOutcome, EventRepo, RegistrationOutcome};
pub use form_repo::FormRepo;
pub use landing_repo::LandingRepo;
pub use onboarding_step_repo::OnboardingStepRepo;
pub use ordering::ReorderOutcome;
pub use performance_goal_repo::PerformanceGoalRepo;
pub use session_repo::SessionRepo;
pub use store_repo::{AdjustOutcome, RedeemOutcome, StoreRepo};
pub use ticket_repo::TicketRepo;
pub use user_repo::{EmailVerifyOutcome, UserRepo};
