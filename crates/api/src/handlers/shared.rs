//! Public read of shared trips. Works without a signed-in identity.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use wayfarer_core::error::CoreError;
use wayfarer_db::models::day_plan::DayPlan;
use wayfarer_db::models::trip::Trip;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SharedTrip {
    pub trip: Trip,
    pub day_plans: Vec<DayPlan>,
}

/// GET /api/v1/shared/{token}
///
/// Each successful read counts as one view of the trip.
pub async fn get_shared_trip(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<SharedTrip>>> {
    let trip = state
        .services
        .trips
        .get_shared(&token)
        .await?
        .ok_or_else(|| CoreError::not_found("SharedTrip", token.as_str()))?;
    let day_plans = state.services.day_plans.get_shared(&token).await?;

    Ok(Json(DataResponse {
        data: SharedTrip { trip, day_plans },
    }))
}
