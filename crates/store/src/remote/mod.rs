//! Remote store adapter over the PostgreSQL repositories.
//!
//! Every operation resolves the signed-in identity first and scopes the
//! query to it; trips and stories filter on `user_id`, day plans on their
//! parent trip's owner. Native `sqlx` errors are translated here.

use async_trait::async_trait;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::ids;
use wayfarer_core::types::{RecordId, Timestamp};
use wayfarer_db::models::day_plan::DayPlan;
use wayfarer_db::models::story::Story;
use wayfarer_db::models::trip::Trip;
use wayfarer_db::repositories::{DayPlanRepo, StoryRepo, TripRepo};
use wayfarer_db::DbPool;

use crate::auth::state::IdentityScope;
use crate::store::{DayPlanStore, RecordScope, StoryStore, TripStore};

/// Translate a native database error into the shared taxonomy.
///
/// Unique violations on `uq_*` constraints become `Conflict`; everything
/// else is logged and reported as `BackendFailure`.
pub fn backend_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Remote store query failed");
    CoreError::BackendFailure(err.to_string())
}

/// Pool plus the identity every query is scoped to.
#[derive(Clone)]
pub struct RemoteContext {
    pool: DbPool,
    scope: IdentityScope,
}

impl RemoteContext {
    pub fn new(pool: DbPool, scope: IdentityScope) -> Self {
        Self { pool, scope }
    }

    pub fn trip_store(&self) -> RemoteTripStore {
        RemoteTripStore { ctx: self.clone() }
    }

    pub fn day_plan_store(&self) -> RemoteDayPlanStore {
        RemoteDayPlanStore { ctx: self.clone() }
    }

    pub fn story_store(&self) -> RemoteStoryStore {
        RemoteStoryStore { ctx: self.clone() }
    }
}

impl RecordScope for RemoteContext {
    fn new_id(&self) -> RecordId {
        ids::remote_id()
    }

    fn owner_id(&self) -> CoreResult<RecordId> {
        self.scope.user_id()
    }
}

macro_rules! delegate_scope {
    ($($store:ty),+) => {
        $(impl RecordScope for $store {
            fn new_id(&self) -> RecordId {
                self.ctx.new_id()
            }

            fn owner_id(&self) -> CoreResult<RecordId> {
                self.ctx.owner_id()
            }
        })+
    };
}

delegate_scope!(RemoteTripStore, RemoteDayPlanStore, RemoteStoryStore);

/// Tell a rejected conditional update apart: gone, or changed underneath us.
fn lost_update(entity: &'static str, id: &str, still_exists: bool) -> CoreError {
    if still_exists {
        CoreError::Conflict(format!("{entity} {id} was modified concurrently"))
    } else {
        CoreError::not_found(entity, id)
    }
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

pub struct RemoteTripStore {
    ctx: RemoteContext,
}

#[async_trait]
impl TripStore for RemoteTripStore {
    async fn list(&self) -> CoreResult<Vec<Trip>> {
        let user_id = self.ctx.owner_id()?;
        TripRepo::list_for_user(&self.ctx.pool, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn find(&self, id: &str) -> CoreResult<Option<Trip>> {
        let user_id = self.ctx.owner_id()?;
        TripRepo::find_for_user(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn insert(&self, trip: Trip) -> CoreResult<Trip> {
        let user_id = self.ctx.owner_id()?;
        if trip.user_id != user_id {
            return Err(CoreError::no_identity());
        }
        TripRepo::insert(&self.ctx.pool, &trip)
            .await
            .map_err(backend_error)
    }

    async fn replace(&self, trip: Trip, expected: Timestamp) -> CoreResult<Trip> {
        let user_id = self.ctx.owner_id()?;
        if trip.user_id != user_id {
            return Err(CoreError::not_found("Trip", trip.id));
        }
        match TripRepo::update_if_unchanged(&self.ctx.pool, &trip, expected)
            .await
            .map_err(backend_error)?
        {
            Some(updated) => Ok(updated),
            None => Err(lost_update("Trip", &trip.id, self.find(&trip.id).await?.is_some())),
        }
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let user_id = self.ctx.owner_id()?;
        TripRepo::delete_for_user(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn view_shared(&self, share_token: &str) -> CoreResult<Option<Trip>> {
        TripRepo::view_shared(&self.ctx.pool, share_token)
            .await
            .map_err(backend_error)
    }
}

// ---------------------------------------------------------------------------
// Day plans
// ---------------------------------------------------------------------------

pub struct RemoteDayPlanStore {
    ctx: RemoteContext,
}

#[async_trait]
impl DayPlanStore for RemoteDayPlanStore {
    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<DayPlan>> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::list_by_trip(&self.ctx.pool, trip_id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn find(&self, id: &str) -> CoreResult<Option<DayPlan>> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::find(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn find_by_number(&self, trip_id: &str, day_number: i32) -> CoreResult<Option<DayPlan>> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::find_by_number(&self.ctx.pool, trip_id, day_number, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn insert(&self, plan: DayPlan) -> CoreResult<DayPlan> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::insert(&self.ctx.pool, &plan, &user_id)
            .await
            .map_err(backend_error)?
            .ok_or_else(|| CoreError::not_found("Trip", plan.trip_id.clone()))
    }

    async fn replace(&self, plan: DayPlan, expected: Timestamp) -> CoreResult<DayPlan> {
        let user_id = self.ctx.owner_id()?;
        match DayPlanRepo::update_if_unchanged(&self.ctx.pool, &plan, expected, &user_id)
            .await
            .map_err(backend_error)?
        {
            Some(updated) => Ok(updated),
            None => Err(lost_update(
                "DayPlan",
                &plan.id,
                self.find(&plan.id).await?.is_some(),
            )),
        }
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::delete(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn delete_by_trip(&self, trip_id: &str) -> CoreResult<u64> {
        let user_id = self.ctx.owner_id()?;
        DayPlanRepo::delete_by_trip(&self.ctx.pool, trip_id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn list_shared(&self, share_token: &str) -> CoreResult<Vec<DayPlan>> {
        DayPlanRepo::list_shared(&self.ctx.pool, share_token)
            .await
            .map_err(backend_error)
    }
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

pub struct RemoteStoryStore {
    ctx: RemoteContext,
}

#[async_trait]
impl StoryStore for RemoteStoryStore {
    async fn list(&self) -> CoreResult<Vec<Story>> {
        let user_id = self.ctx.owner_id()?;
        StoryRepo::list_for_user(&self.ctx.pool, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<Story>> {
        let user_id = self.ctx.owner_id()?;
        StoryRepo::list_by_trip(&self.ctx.pool, trip_id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn find(&self, id: &str) -> CoreResult<Option<Story>> {
        let user_id = self.ctx.owner_id()?;
        StoryRepo::find_for_user(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }

    async fn insert(&self, story: Story) -> CoreResult<Story> {
        let user_id = self.ctx.owner_id()?;
        if story.user_id != user_id {
            return Err(CoreError::no_identity());
        }
        StoryRepo::insert(&self.ctx.pool, &story)
            .await
            .map_err(backend_error)
    }

    async fn replace(&self, story: Story, expected: Timestamp) -> CoreResult<Story> {
        let user_id = self.ctx.owner_id()?;
        if story.user_id != user_id {
            return Err(CoreError::not_found("Story", story.id));
        }
        match StoryRepo::update_if_unchanged(&self.ctx.pool, &story, expected)
            .await
            .map_err(backend_error)?
        {
            Some(updated) => Ok(updated),
            None => Err(lost_update("Story", &story.id, self.find(&story.id).await?.is_some())),
        }
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let user_id = self.ctx.owner_id()?;
        StoryRepo::delete_for_user(&self.ctx.pool, id, &user_id)
            .await
            .map_err(backend_error)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn non_database_errors_are_backend_failures() {
        assert_matches!(
            backend_error(sqlx::Error::PoolTimedOut),
            CoreError::BackendFailure(_)
        );
    }

    #[test]
    fn conflict_wording_depends_on_existence() {
        assert_matches!(lost_update("Trip", "t1", true), CoreError::Conflict(_));
        assert_matches!(
            lost_update("Trip", "t1", false),
            CoreError::NotFound { entity: "Trip", .. }
        );
    }
}
