//! Handlers for the `/trips` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_core::error::CoreError;
use wayfarer_core::itinerary::Itinerary;
use wayfarer_core::types::RecordId;
use wayfarer_db::models::status::TripStatus;
use wayfarer_db::models::trip::{CreateTrip, Trip, UpdateTrip};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub trip_id: RecordId,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TripStatus,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub share_token: String,
}

/// POST /api/v1/trips
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTrip>,
) -> AppResult<(StatusCode, Json<DataResponse<Trip>>)> {
    let trip = state.services.trips.create(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: trip })))
}

/// GET /api/v1/trips
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Trip>>>> {
    let trips = state.services.trips.get_all().await?;
    Ok(Json(DataResponse { data: trips }))
}

/// GET /api/v1/trips/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.get_by_id(&id).await?;
    Ok(Json(DataResponse { data: trip }))
}

/// PUT /api/v1/trips/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<UpdateTrip>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.update(&id, input).await?;
    Ok(Json(DataResponse { data: trip }))
}

/// DELETE /api/v1/trips/{id}
///
/// Removes the trip's day plans along with it.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<StatusCode> {
    state.services.delete_trip(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/trips/{id}/itinerary
pub async fn update_itinerary(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(itinerary): Json<Itinerary>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.update_itinerary(&id, itinerary).await?;
    Ok(Json(DataResponse { data: trip }))
}

/// PUT /api/v1/trips/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.set_status(&id, input.status).await?;
    Ok(Json(DataResponse { data: trip }))
}

/// POST /api/v1/trips/{id}/share
pub async fn share(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<DataResponse<ShareResponse>>> {
    let share_token = state.services.trips.share(&id).await?;
    Ok(Json(DataResponse {
        data: ShareResponse { share_token },
    }))
}

/// DELETE /api/v1/trips/{id}/share
pub async fn unshare(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.unshare(&id).await?;
    Ok(Json(DataResponse { data: trip }))
}

// ---------------------------------------------------------------------------
// Active trip
// ---------------------------------------------------------------------------

/// GET /api/v1/trips/active
///
/// `data` is `null` when no trip is active or the remembered trip is gone.
pub async fn get_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<Trip>>>> {
    let trips = &state.services.trips;
    let Some(id) = trips.get_active_id().await? else {
        return Ok(Json(DataResponse { data: None }));
    };

    match trips.get_by_id(&id).await {
        Ok(trip) => Ok(Json(DataResponse { data: Some(trip) })),
        Err(CoreError::NotFound { .. }) => {
            tracing::debug!(trip_id = %id, "Active trip no longer exists, clearing");
            trips.clear_active().await?;
            Ok(Json(DataResponse { data: None }))
        }
        Err(e) => Err(e.into()),
    }
}

/// PUT /api/v1/trips/active
pub async fn set_active(
    State(state): State<AppState>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = state.services.trips.set_active(&input.trip_id).await?;
    Ok(Json(DataResponse { data: trip }))
}

/// DELETE /api/v1/trips/active
pub async fn clear_active(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.services.trips.clear_active().await?;
    Ok(StatusCode::NO_CONTENT)
}
