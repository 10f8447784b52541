//! Local store adapter: every entity lives as a JSON array in a
//! [`KeyValueStore`], scanned linearly.
//!
//! Local mode has exactly one identity ([`LOCAL_IDENTITY_ID`]); all records
//! belong to it and no ownership filtering happens.

pub mod collection;

use std::sync::Arc;

use async_trait::async_trait;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::ids;
use wayfarer_core::types::{RecordId, Timestamp};
use wayfarer_db::models::day_plan::DayPlan;
use wayfarer_db::models::story::Story;
use wayfarer_db::models::trip::Trip;

use crate::kv::{keys, KeyValueStore};
use crate::store::{DayPlanStore, RecordScope, StoryStore, TripStore};
use collection::{no_check, sort_newest_first, Collection};

/// Id of the single local-mode identity.
pub const LOCAL_IDENTITY_ID: &str = "local-user";

fn local_scope_owner() -> CoreResult<RecordId> {
    Ok(LOCAL_IDENTITY_ID.to_string())
}

/// The three entity collections over one key-value store.
///
/// Day plans need read access to trips, so collections are shared.
#[derive(Clone)]
pub struct LocalCollections {
    trips: Arc<Collection<Trip>>,
    day_plans: Arc<Collection<DayPlan>>,
    stories: Arc<Collection<Story>>,
}

impl LocalCollections {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            trips: Arc::new(Collection::new(kv.clone(), keys::TRIPS)),
            day_plans: Arc::new(Collection::new(kv.clone(), keys::DAY_PLANS)),
            stories: Arc::new(Collection::new(kv, keys::STORIES)),
        }
    }

    pub fn trip_store(&self) -> LocalTripStore {
        LocalTripStore {
            trips: self.trips.clone(),
        }
    }

    pub fn day_plan_store(&self) -> LocalDayPlanStore {
        LocalDayPlanStore {
            trips: self.trips.clone(),
            day_plans: self.day_plans.clone(),
        }
    }

    pub fn story_store(&self) -> LocalStoryStore {
        LocalStoryStore {
            stories: self.stories.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

pub struct LocalTripStore {
    trips: Arc<Collection<Trip>>,
}

impl RecordScope for LocalTripStore {
    fn new_id(&self) -> RecordId {
        ids::local_id()
    }

    fn owner_id(&self) -> CoreResult<RecordId> {
        local_scope_owner()
    }
}

#[async_trait]
impl TripStore for LocalTripStore {
    async fn list(&self) -> CoreResult<Vec<Trip>> {
        let mut trips = self.trips.snapshot().await?;
        sort_newest_first(&mut trips);
        Ok(trips)
    }

    async fn find(&self, id: &str) -> CoreResult<Option<Trip>> {
        self.trips.find(id).await
    }

    async fn insert(&self, trip: Trip) -> CoreResult<Trip> {
        self.trips.insert(trip, unique_share_token).await
    }

    async fn replace(&self, trip: Trip, expected: Timestamp) -> CoreResult<Trip> {
        self.trips.replace(trip, expected, unique_share_token).await
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        self.trips.remove(id).await
    }

    async fn view_shared(&self, share_token: &str) -> CoreResult<Option<Trip>> {
        self.trips
            .mutate(|trips| {
                Ok(trips
                    .iter_mut()
                    .find(|t| t.share_token.as_deref() == Some(share_token))
                    .map(|t| {
                        t.view_count += 1;
                        t.clone()
                    }))
            })
            .await
    }
}

fn unique_share_token(trips: &[Trip], candidate: &Trip) -> CoreResult<()> {
    let Some(token) = candidate.share_token.as_deref() else {
        return Ok(());
    };
    if trips
        .iter()
        .any(|t| t.id != candidate.id && t.share_token.as_deref() == Some(token))
    {
        return Err(CoreError::Conflict("Share token already in use".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Day plans
// ---------------------------------------------------------------------------

pub struct LocalDayPlanStore {
    trips: Arc<Collection<Trip>>,
    day_plans: Arc<Collection<DayPlan>>,
}

impl RecordScope for LocalDayPlanStore {
    fn new_id(&self) -> RecordId {
        ids::local_id()
    }

    fn owner_id(&self) -> CoreResult<RecordId> {
        local_scope_owner()
    }
}

fn by_day_number(mut plans: Vec<DayPlan>) -> Vec<DayPlan> {
    plans.sort_by_key(|p| p.day_number);
    plans
}

fn unique_day_number(plans: &[DayPlan], candidate: &DayPlan) -> CoreResult<()> {
    if plans.iter().any(|p| {
        p.id != candidate.id && p.trip_id == candidate.trip_id && p.day_number == candidate.day_number
    }) {
        return Err(CoreError::Conflict(format!(
            "Day {} already exists for trip {}",
            candidate.day_number, candidate.trip_id
        )));
    }
    Ok(())
}

#[async_trait]
impl DayPlanStore for LocalDayPlanStore {
    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<DayPlan>> {
        let plans = self.day_plans.snapshot().await?;
        Ok(by_day_number(
            plans.into_iter().filter(|p| p.trip_id == trip_id).collect(),
        ))
    }

    async fn find(&self, id: &str) -> CoreResult<Option<DayPlan>> {
        self.day_plans.find(id).await
    }

    async fn find_by_number(&self, trip_id: &str, day_number: i32) -> CoreResult<Option<DayPlan>> {
        Ok(self
            .day_plans
            .snapshot()
            .await?
            .into_iter()
            .find(|p| p.trip_id == trip_id && p.day_number == day_number))
    }

    /// The trips lock is held across the insert so the trip cannot be
    /// removed between the check and the write. Lock order: trips, then
    /// day plans.
    async fn insert(&self, plan: DayPlan) -> CoreResult<DayPlan> {
        let (_trips_held, trips) = self.trips.hold().await?;
        if !trips.iter().any(|t| t.id == plan.trip_id) {
            return Err(CoreError::not_found("Trip", plan.trip_id));
        }
        self.day_plans.insert(plan, unique_day_number).await
    }

    async fn replace(&self, plan: DayPlan, expected: Timestamp) -> CoreResult<DayPlan> {
        self.day_plans.replace(plan, expected, unique_day_number).await
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        self.day_plans.remove(id).await
    }

    async fn delete_by_trip(&self, trip_id: &str) -> CoreResult<u64> {
        self.day_plans.remove_where(|p| p.trip_id == trip_id).await
    }

    async fn list_shared(&self, share_token: &str) -> CoreResult<Vec<DayPlan>> {
        let trips = self.trips.snapshot().await?;
        let Some(trip) = trips
            .iter()
            .find(|t| t.share_token.as_deref() == Some(share_token))
        else {
            return Ok(Vec::new());
        };
        self.list_by_trip(&trip.id).await
    }
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

pub struct LocalStoryStore {
    stories: Arc<Collection<Story>>,
}

impl RecordScope for LocalStoryStore {
    fn new_id(&self) -> RecordId {
        ids::local_id()
    }

    fn owner_id(&self) -> CoreResult<RecordId> {
        local_scope_owner()
    }
}

#[async_trait]
impl StoryStore for LocalStoryStore {
    async fn list(&self) -> CoreResult<Vec<Story>> {
        let mut stories = self.stories.snapshot().await?;
        sort_newest_first(&mut stories);
        Ok(stories)
    }

    async fn list_by_trip(&self, trip_id: &str) -> CoreResult<Vec<Story>> {
        let mut stories: Vec<Story> = self
            .stories
            .snapshot()
            .await?
            .into_iter()
            .filter(|s| s.trip_id.as_deref() == Some(trip_id))
            .collect();
        sort_newest_first(&mut stories);
        Ok(stories)
    }

    async fn find(&self, id: &str) -> CoreResult<Option<Story>> {
        self.stories.find(id).await
    }

    async fn insert(&self, story: Story) -> CoreResult<Story> {
        self.stories.insert(story, no_check).await
    }

    async fn replace(&self, story: Story, expected: Timestamp) -> CoreResult<Story> {
        self.stories.replace(story, expected, no_check).await
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        self.stories.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use std::time::Duration;

    use chrono::NaiveDate;
    use wayfarer_core::clock;
    use wayfarer_core::itinerary::Itinerary;
    use wayfarer_db::models::status::{BudgetTier, TripStatus};

    use super::*;
    use crate::kv::MemoryKv;

    fn collections() -> LocalCollections {
        LocalCollections::new(Arc::new(MemoryKv::new()))
    }

    fn trip(id: &str, share_token: Option<&str>) -> Trip {
        let now = clock::now();
        Trip {
            id: id.into(),
            user_id: LOCAL_IDENTITY_ID.into(),
            destination: "Lisbon".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            budget: BudgetTier::Moderate,
            travelers: 2,
            interests: vec!["food".into()],
            accommodation: None,
            transport: None,
            itinerary: Itinerary::default(),
            status: TripStatus::Planning,
            share_token: share_token.map(String::from),
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(id: &str, trip_id: &str, day_number: i32) -> DayPlan {
        let now = clock::now();
        DayPlan {
            id: id.into(),
            trip_id: trip_id.into(),
            day_number,
            date: NaiveDate::from_ymd_opt(2026, 5, day_number as u32).unwrap(),
            activities: Vec::new(),
            notes: None,
            budget: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn trips_list_newest_first() {
        let store = collections().trip_store();
        store.insert(trip("first", None)).await.unwrap();
        store.insert(trip("second", None)).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn shared_view_counts_without_touching_updated_at() {
        let store = collections().trip_store();
        let stored = store.insert(trip("t1", Some("tok"))).await.unwrap();

        let viewed = store.view_shared("tok").await.unwrap().unwrap();
        assert_eq!(viewed.view_count, 1);
        assert_eq!(viewed.updated_at, stored.updated_at);
        assert_eq!(store.view_shared("tok").await.unwrap().unwrap().view_count, 2);
        assert!(store.view_shared("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn day_plan_requires_known_trip() {
        let plans = collections().day_plan_store();
        assert_matches!(
            plans.insert(plan("p1", "missing", 1)).await,
            Err(CoreError::NotFound { entity: "Trip", .. })
        );
    }

    #[tokio::test]
    async fn trip_removal_waits_for_day_plan_insert() {
        let local = collections();
        let trips = Arc::new(local.trip_store());
        let plans = Arc::new(local.day_plan_store());
        trips.insert(trip("t1", None)).await.unwrap();

        // Park the insert after its trip check by holding the day plans lock.
        let (plans_held, _) = local.day_plans.hold().await.unwrap();
        let insert = tokio::spawn({
            let plans = plans.clone();
            async move { plans.insert(plan("p1", "t1", 1)).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let removal = tokio::spawn({
            let trips = trips.clone();
            async move { trips.delete("t1").await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!removal.is_finished());

        drop(plans_held);
        insert.await.unwrap().unwrap();
        assert!(removal.await.unwrap().unwrap());

        assert_matches!(
            plans.insert(plan("p2", "t1", 2)).await,
            Err(CoreError::NotFound { entity: "Trip", .. })
        );
    }

    #[tokio::test]
    async fn duplicate_day_number_conflicts() {
        let local = collections();
        local.trip_store().insert(trip("t1", None)).await.unwrap();
        let plans = local.day_plan_store();
        plans.insert(plan("p1", "t1", 1)).await.unwrap();

        assert_matches!(
            plans.insert(plan("p2", "t1", 1)).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn day_plans_ordered_and_shared_through_trip_token() {
        let local = collections();
        local.trip_store().insert(trip("t1", Some("tok"))).await.unwrap();
        let plans = local.day_plan_store();
        plans.insert(plan("p3", "t1", 3)).await.unwrap();
        plans.insert(plan("p1", "t1", 1)).await.unwrap();

        let numbers: Vec<_> = plans
            .list_by_trip("t1")
            .await
            .unwrap()
            .iter()
            .map(|p| p.day_number)
            .collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(plans.list_shared("tok").await.unwrap().len(), 2);
        assert!(plans.list_shared("nope").await.unwrap().is_empty());

        assert_eq!(plans.delete_by_trip("t1").await.unwrap(), 2);
        assert!(plans.list_by_trip("t1").await.unwrap().is_empty());
    }

    #[test]
    fn local_owner_is_fixed() {
        let store = collections().story_store();
        assert_eq!(store.owner_id().unwrap(), LOCAL_IDENTITY_ID);
        assert_ne!(store.new_id(), store.new_id());
    }
}
