//! Trip entity service.

use std::sync::Arc;

use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::itinerary::Itinerary;
use wayfarer_core::types::RecordId;
use wayfarer_core::validation::{require_at_least, require_date_range, require_non_empty};
use wayfarer_core::{clock, ids};
use wayfarer_db::models::status::TripStatus;
use wayfarer_db::models::trip::{CreateTrip, Trip, UpdateTrip};

use crate::kv::{keys, KeyValueStore};
use crate::store::TripStore;

pub struct TripService {
    store: Arc<dyn TripStore>,
    /// Client-side state (active trip slot).
    kv: Arc<dyn KeyValueStore>,
}

impl TripService {
    pub fn new(store: Arc<dyn TripStore>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { store, kv }
    }

    /// All trips of the current owner, newest first.
    pub async fn get_all(&self) -> CoreResult<Vec<Trip>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> CoreResult<Trip> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Trip", id))
    }

    pub async fn create(&self, input: CreateTrip) -> CoreResult<Trip> {
        require_non_empty("destination", &input.destination)?;
        require_date_range(input.start_date, input.end_date)?;
        require_at_least("travelers", input.travelers, 1)?;
        let itinerary = input.itinerary.unwrap_or_default();
        itinerary.validate()?;

        let now = clock::now();
        let trip = Trip {
            id: self.store.new_id(),
            user_id: self.store.owner_id()?,
            destination: input.destination.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            travelers: input.travelers,
            interests: input.interests,
            accommodation: input.accommodation,
            transport: input.transport,
            itinerary,
            status: input.status.unwrap_or_default(),
            share_token: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(trip).await?;
        tracing::info!(trip_id = %created.id, destination = %created.destination, "Trip created");
        Ok(created)
    }

    /// Merge `changes` into the stored trip.
    ///
    /// Fails with `Conflict` if the trip changed between the read and the write.
    pub async fn update(&self, id: &str, changes: UpdateTrip) -> CoreResult<Trip> {
        let current = self.get_by_id(id).await?;
        self.write(current, changes).await
    }

    async fn write(&self, current: Trip, changes: UpdateTrip) -> CoreResult<Trip> {
        if let Some(destination) = &changes.destination {
            require_non_empty("destination", destination)?;
        }
        if let Some(travelers) = changes.travelers {
            require_at_least("travelers", travelers, 1)?;
        }
        if let Some(itinerary) = &changes.itinerary {
            itinerary.validate()?;
        }

        let expected = current.updated_at;
        let mut trip = current;
        if let Some(destination) = changes.destination {
            trip.destination = destination.trim().to_string();
        }
        if let Some(start_date) = changes.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            trip.end_date = end_date;
        }
        if let Some(budget) = changes.budget {
            trip.budget = budget;
        }
        if let Some(travelers) = changes.travelers {
            trip.travelers = travelers;
        }
        if let Some(interests) = changes.interests {
            trip.interests = interests;
        }
        if let Some(accommodation) = changes.accommodation {
            trip.accommodation = Some(accommodation);
        }
        if let Some(transport) = changes.transport {
            trip.transport = Some(transport);
        }
        if let Some(itinerary) = changes.itinerary {
            trip.itinerary = itinerary;
        }
        if let Some(status) = changes.status {
            trip.status = status;
        }
        require_date_range(trip.start_date, trip.end_date)?;

        trip.updated_at = clock::after(expected);
        self.store.replace(trip, expected).await
    }

    pub async fn update_itinerary(&self, id: &str, itinerary: Itinerary) -> CoreResult<Trip> {
        self.update(
            id,
            UpdateTrip {
                itinerary: Some(itinerary),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_status(&self, id: &str, status: TripStatus) -> CoreResult<Trip> {
        self.update(
            id,
            UpdateTrip {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Publish the trip, returning its share token. Sharing an already shared
    /// trip returns the existing token.
    pub async fn share(&self, id: &str) -> CoreResult<String> {
        let current = self.get_by_id(id).await?;
        if let Some(token) = current.share_token {
            return Ok(token);
        }

        let token = ids::share_token();
        let expected = current.updated_at;
        let mut trip = current;
        trip.share_token = Some(token.clone());
        trip.updated_at = clock::after(expected);
        self.store.replace(trip, expected).await?;
        tracing::info!(trip_id = %id, "Trip shared");
        Ok(token)
    }

    /// Withdraw the share token; old links stop resolving.
    pub async fn unshare(&self, id: &str) -> CoreResult<Trip> {
        let current = self.get_by_id(id).await?;
        if current.share_token.is_none() {
            return Ok(current);
        }

        let expected = current.updated_at;
        let mut trip = current;
        trip.share_token = None;
        trip.updated_at = clock::after(expected);
        self.store.replace(trip, expected).await
    }

    /// Public read of a shared trip; counts the view. Needs no identity.
    pub async fn get_shared(&self, share_token: &str) -> CoreResult<Option<Trip>> {
        self.store.view_shared(share_token).await
    }

    /// Delete a trip. Day plans and stories are left to their own services.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.store.delete(id).await? {
            return Err(CoreError::not_found("Trip", id));
        }
        if self.get_active_id().await?.as_deref() == Some(id) {
            self.clear_active().await?;
        }
        tracing::info!(trip_id = %id, "Trip deleted");
        Ok(())
    }

    // -- Active trip slot ----------------------------------------------------

    /// Remember `id` as the open trip. The trip must exist.
    pub async fn set_active(&self, id: &str) -> CoreResult<Trip> {
        let trip = self.get_by_id(id).await?;
        self.kv.set_item(keys::ACTIVE_TRIP, &trip.id).await?;
        Ok(trip)
    }

    pub async fn get_active_id(&self) -> CoreResult<Option<RecordId>> {
        self.kv.get_item(keys::ACTIVE_TRIP).await
    }

    pub async fn clear_active(&self) -> CoreResult<()> {
        self.kv.remove_item(keys::ACTIVE_TRIP).await
    }
}
