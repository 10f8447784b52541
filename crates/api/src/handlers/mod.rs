pub mod auth;
pub mod day_plan;
pub mod mode;
pub mod shared;
pub mod story;
pub mod trip;
