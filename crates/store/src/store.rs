//! Capability traits implemented once per substrate.
//!
//! Services hold a `dyn` store chosen at construction time and never branch
//! on the storage mode themselves. Every implementation must:
//!
//! - return trips and stories newest-first, day plans by `day_number`;
//! - report a missing record on `replace` as `NotFound` and a record whose
//!   `updated_at` moved since it was read as `Conflict`;
//! - reject a second day plan with the same `(trip_id, day_number)` as
//!   `Conflict`.

use async_trait::async_trait;
use wayfarer_core::error::CoreResult;
use wayfarer_core::types::{RecordId, Timestamp};
use wayfarer_db::models::day_plan::DayPlan;
use wayfarer_db::models::story::Story;
use wayfarer_db::models::trip::Trip;

/// Id allocation and ownership shared by all entity stores.
pub trait RecordScope: Send + Sync {
    /// Allocate a fresh record id in this substrate's format.
    fn new_id(&self) -> RecordId;

    /// Identity that owns records created now.
    ///
    /// Remote stores fail with `Unauthenticated` when nobody is signed in.
    fn owner_id(&self) -> CoreResult<RecordId>;
}

#[async_trait]
pub trait TripStore: RecordScope {
    async fn list(&self) -> CoreResult<Vec<Trip>>;
    async fn find(&self, id: &str) -> CoreResult<Option<Trip>>;
    async fn insert(&self, trip: Trip) -> CoreResult<Trip>;
    /// Overwrite `trip` if its stored `updated_at` still equals `expected`.
    async fn replace(&self, trip: Trip, expected: Timestamp) -> CoreResult<Trip>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
    /// Look up a shared trip by token and count the view.
    async fn view_shared(&self, share_token: &str) -> CoreResult<Option<Trip>>;
}

#[async_trait]
pub trait DayPlanStore: RecordScope {
    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<DayPlan>>;
    async fn find(&self, id: &str) -> CoreResult<Option<DayPlan>>;
    async fn find_by_number(&self, trip_id: &str, day_number: i32) -> CoreResult<Option<DayPlan>>;
    /// Fails with `NotFound` when the parent trip is unknown to the caller.
    async fn insert(&self, plan: DayPlan) -> CoreResult<DayPlan>;
    async fn replace(&self, plan: DayPlan, expected: Timestamp) -> CoreResult<DayPlan>;
    async fn delete(&self, id: &str) -> CoreResult<bool>;
    /// Returns how many plans were removed.
    async fn delete_by_trip(&self, trip_id: &str) -> CoreResult<u64>;
    /// Plans of the trip currently shared under `share_token`.
    async fn list_shared(&self, share_token: &str) -> CoreResult<Vec<DayPlan>>;
}

#[async_trait]
pub trait StoryStore: RecordScope {
    async fn list(&self) -> CoreResult<Vec<Story>>;
    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<Story>>;
    async fn find(&self, id: &str) -> CoreResult<Option<Story>>;
    async fn insert(&self, story: Story) -> CoreResult<Story>;
    async fn replace(&self, story: Story, expected: Timestamp) -> CoreResult<Story>;
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}
