//! Trip entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayfarer_core::itinerary::Itinerary;
use wayfarer_core::types::{Date, RecordId, Timestamp};

use crate::models::status::{BudgetTier, TripStatus};

/// A trip row from the `trips` table / element of the local `trips` collection.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Trip {
    pub id: RecordId,
    /// Owning identity.
    pub user_id: RecordId,
    pub destination: String,
    pub start_date: Date,
    pub end_date: Date,
    #[sqlx(try_from = "String")]
    pub budget: BudgetTier,
    pub travelers: i32,
    pub interests: Vec<String>,
    pub accommodation: Option<String>,
    pub transport: Option<String>,
    #[sqlx(json)]
    pub itinerary: Itinerary,
    #[sqlx(try_from = "String")]
    pub status: TripStatus,
    /// Present while the trip is publicly shared.
    pub share_token: Option<String>,
    pub view_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new trip.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrip {
    pub destination: String,
    pub start_date: Date,
    pub end_date: Date,
    pub budget: BudgetTier,
    /// Defaults to 1.
    #[serde(default = "default_travelers")]
    pub travelers: i32,
    #[serde(default)]
    pub interests: Vec<String>,
    pub accommodation: Option<String>,
    pub transport: Option<String>,
    /// Generated elsewhere and handed over as-is; empty when omitted.
    #[serde(default)]
    pub itinerary: Option<Itinerary>,
    /// Defaults to `planning`.
    #[serde(default)]
    pub status: Option<TripStatus>,
}

fn default_travelers() -> i32 {
    1
}

/// DTO for updating an existing trip. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrip {
    pub destination: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub budget: Option<BudgetTier>,
    pub travelers: Option<i32>,
    pub interests: Option<Vec<String>>,
    pub accommodation: Option<String>,
    pub transport: Option<String>,
    pub itinerary: Option<Itinerary>,
    pub status: Option<TripStatus>,
}
