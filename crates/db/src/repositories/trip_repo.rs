//! Repository for the `trips` table.

use sqlx::types::Json;
use sqlx::PgPool;
use wayfarer_core::types::Timestamp;

use crate::models::trip::Trip;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, destination, start_date, end_date, budget, travelers, \
                       interests, accommodation, transport, itinerary, status, share_token, \
                       view_count, created_at, updated_at";

/// Provides owner-scoped CRUD operations for trips.
pub struct TripRepo;

impl TripRepo {
    /// Insert a fully built trip, returning the stored row.
    pub async fn insert(pool: &PgPool, trip: &Trip) -> Result<Trip, sqlx::Error> {
        let query = format!(
            "INSERT INTO trips (id, user_id, destination, start_date, end_date, budget, travelers,
                                interests, accommodation, transport, itinerary, status, share_token,
                                view_count, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trip>(&query)
            .bind(&trip.id)
            .bind(&trip.user_id)
            .bind(&trip.destination)
            .bind(trip.start_date)
            .bind(trip.end_date)
            .bind(trip.budget.as_str())
            .bind(trip.travelers)
            .bind(&trip.interests)
            .bind(&trip.accommodation)
            .bind(&trip.transport)
            .bind(Json(&trip.itinerary))
            .bind(trip.status.as_str())
            .bind(&trip.share_token)
            .bind(trip.view_count)
            .bind(trip.created_at)
            .bind(trip.updated_at)
            .fetch_one(pool)
            .await
    }

    /// List an owner's trips, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Trip>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trips WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Trip>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of an owner's trips by id.
    pub async fn find_for_user(
        pool: &PgPool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trips WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every mutable column of a trip, but only if the stored
    /// `updated_at` still equals `expected_updated_at`.
    ///
    /// Returns `None` if the row is missing, owned by someone else, or was
    /// modified since it was read.
    pub async fn update_if_unchanged(
        pool: &PgPool,
        trip: &Trip,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!(
            "UPDATE trips SET
                destination = $3,
                start_date = $4,
                end_date = $5,
                budget = $6,
                travelers = $7,
                interests = $8,
                accommodation = $9,
                transport = $10,
                itinerary = $11,
                status = $12,
                share_token = $13,
                updated_at = $14
             WHERE id = $1 AND user_id = $2 AND updated_at = $15
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trip>(&query)
            .bind(&trip.id)
            .bind(&trip.user_id)
            .bind(&trip.destination)
            .bind(trip.start_date)
            .bind(trip.end_date)
            .bind(trip.budget.as_str())
            .bind(trip.travelers)
            .bind(&trip.interests)
            .bind(&trip.accommodation)
            .bind(&trip.transport)
            .bind(Json(&trip.itinerary))
            .bind(trip.status.as_str())
            .bind(&trip.share_token)
            .bind(trip.updated_at)
            .bind(expected_updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete one of an owner's trips. Returns `true` if a row was removed.
    pub async fn delete_for_user(pool: &PgPool, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Public read by share token, counting the view.
    ///
    /// Not owner-scoped: the token itself is the capability. The view
    /// counter is not a user edit, so `updated_at` is left alone.
    pub async fn view_shared(pool: &PgPool, share_token: &str) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!(
            "UPDATE trips SET view_count = view_count + 1
             WHERE share_token = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trip>(&query)
            .bind(share_token)
            .fetch_optional(pool)
            .await
    }
}
