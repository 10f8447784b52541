//! Entity services and their wiring.
//!
//! [`Services`] is built once per process after the mode resolves; every
//! service holds the store implementation for that mode.

pub mod day_plan;
pub mod story;
pub mod trip;

use std::sync::Arc;

use wayfarer_core::error::CoreResult;
use wayfarer_core::mode::StorageMode;
use wayfarer_db::DbPool;
use wayfarer_events::EventBus;

use crate::auth::local::LocalIdentityProvider;
use crate::auth::remote::RemoteIdentityProvider;
use crate::auth::session::SessionConfig;
use crate::auth::AuthService;
use crate::blob::{BlobStore, FsBlobStore, InlineBlobStore};
use crate::config::StoreConfig;
use crate::kv::KeyValueStore;
use crate::local::LocalCollections;
use crate::mode::ModeResolver;
use crate::remote::RemoteContext;

pub use day_plan::DayPlanService;
pub use story::StoryService;
pub use trip::TripService;

pub struct Services {
    pub mode: StorageMode,
    pub events: Arc<EventBus>,
    pub auth: Arc<AuthService>,
    pub trips: TripService,
    pub day_plans: DayPlanService,
    pub stories: StoryService,
}

impl Services {
    /// Wire every service for the mode `resolver` settled on.
    ///
    /// `kv` always holds client state (session, active trip); in local mode
    /// it also holds the entity collections.
    pub fn build(resolver: &ModeResolver, config: &StoreConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        match resolver.pool() {
            Some(pool) => Self::remote(
                pool.clone(),
                kv,
                config.session(),
                Arc::new(FsBlobStore::new(config.blob_dir(), &config.public_base_url)),
            ),
            None => Self::local(kv),
        }
    }

    pub fn local(kv: Arc<dyn KeyValueStore>) -> Self {
        let events = Arc::new(EventBus::default());
        let auth = Arc::new(AuthService::new(
            Arc::new(LocalIdentityProvider::new(kv.clone())),
            events.clone(),
        ));
        let collections = LocalCollections::new(kv.clone());

        Self {
            mode: StorageMode::Local,
            events,
            auth,
            trips: TripService::new(Arc::new(collections.trip_store()), kv),
            day_plans: DayPlanService::new(Arc::new(collections.day_plan_store())),
            stories: StoryService::new(Arc::new(collections.story_store()), Arc::new(InlineBlobStore)),
        }
    }

    pub fn remote(
        pool: DbPool,
        kv: Arc<dyn KeyValueStore>,
        session: SessionConfig,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let auth = Arc::new(AuthService::new(
            Arc::new(RemoteIdentityProvider::new(pool.clone(), kv.clone(), session)),
            events.clone(),
        ));
        let ctx = RemoteContext::new(pool, auth.scope());

        Self {
            mode: StorageMode::Remote,
            events,
            auth,
            trips: TripService::new(Arc::new(ctx.trip_store()), kv),
            day_plans: DayPlanService::new(Arc::new(ctx.day_plan_store())),
            stories: StoryService::new(Arc::new(ctx.story_store()), blobs),
        }
    }

    /// Delete a trip together with its day plans.
    ///
    /// Plans go first: remote plan deletion is scoped through the owning
    /// trip row, so it matches nothing once the trip is gone.
    pub async fn delete_trip(&self, id: &str) -> CoreResult<()> {
        self.trips.get_by_id(id).await?;
        self.day_plans.delete_by_trip(id).await?;
        self.trips.delete(id).await
    }
}
