//! Table repositories for the remote relational collaborator.
//!
//! Every query that reads or writes user-owned data takes the owner's id
//! and filters on it; day plans are scoped through their parent trip.

pub mod day_plan_repo;
pub mod identity_repo;
pub mod password_reset_repo;
pub mod story_repo;
pub mod trip_repo;

pub use day_plan_repo::DayPlanRepo;
pub use identity_repo::IdentityRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use story_repo::StoryRepo;
pub use trip_repo::TripRepo;
