//! Handlers for day plans and their activities.
//!
//! Trip-scoped listing and creation live under `/trips/{id}/day-plans`;
//! everything addressed by plan id lives under `/day-plans/{id}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use wayfarer_core::error::CoreError;
use wayfarer_core::types::{Date, RecordId};
use wayfarer_db::models::day_plan::{
    CreateActivity, CreateDayPlan, DayPlan, UpdateActivity, UpdateDayPlan,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /trips/{id}/day-plans`; the trip comes from the path.
#[derive(Debug, Deserialize)]
pub struct NewDayPlan {
    pub day_number: i32,
    pub date: Date,
    #[serde(default)]
    pub activities: Vec<CreateActivity>,
    pub notes: Option<String>,
    pub budget: Option<f64>,
}

/// GET /api/v1/trips/{id}/day-plans
pub async fn list_by_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<RecordId>,
) -> AppResult<Json<DataResponse<Vec<DayPlan>>>> {
    let plans = state.services.day_plans.get_by_trip(&trip_id).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/v1/trips/{id}/day-plans
pub async fn create(
    State(state): State<AppState>,
    Path(trip_id): Path<RecordId>,
    Json(input): Json<NewDayPlan>,
) -> AppResult<(StatusCode, Json<DataResponse<DayPlan>>)> {
    let plan = state
        .services
        .day_plans
        .create(CreateDayPlan {
            trip_id,
            day_number: input.day_number,
            date: input.date,
            activities: input.activities,
            notes: input.notes,
            budget: input.budget,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// POST /api/v1/trips/{id}/day-plans/from-itinerary
///
/// Builds one plan per day of the trip's stored itinerary, dated from the
/// trip's start date.
pub async fn create_from_itinerary(
    State(state): State<AppState>,
    Path(trip_id): Path<RecordId>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<DayPlan>>>)> {
    let trip = state.services.trips.get_by_id(&trip_id).await?;
    let plans = state
        .services
        .day_plans
        .create_from_itinerary(&trip.id, trip.start_date, &trip.itinerary)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: plans })))
}

/// GET /api/v1/trips/{id}/day-plans/by-number/{n}
pub async fn get_by_number(
    State(state): State<AppState>,
    Path((trip_id, day_number)): Path<(RecordId, i32)>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state
        .services
        .day_plans
        .get_by_number(&trip_id, day_number)
        .await?
        .ok_or_else(|| CoreError::not_found("DayPlan", format!("{trip_id}/day/{day_number}")))?;
    Ok(Json(DataResponse { data: plan }))
}

/// GET /api/v1/day-plans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state.services.day_plans.get_by_id(&id).await?;
    Ok(Json(DataResponse { data: plan }))
}

/// PUT /api/v1/day-plans/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<UpdateDayPlan>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state.services.day_plans.update(&id, input).await?;
    Ok(Json(DataResponse { data: plan }))
}

/// DELETE /api/v1/day-plans/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<StatusCode> {
    state.services.day_plans.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// POST /api/v1/day-plans/{id}/activities
pub async fn add_activity(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<CreateActivity>,
) -> AppResult<(StatusCode, Json<DataResponse<DayPlan>>)> {
    let plan = state.services.day_plans.add_activity(&id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// PUT /api/v1/day-plans/{id}/activities/{activity_id}
pub async fn update_activity(
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(RecordId, RecordId)>,
    Json(input): Json<UpdateActivity>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state
        .services
        .day_plans
        .update_activity(&id, &activity_id, input)
        .await?;
    Ok(Json(DataResponse { data: plan }))
}

/// DELETE /api/v1/day-plans/{id}/activities/{activity_id}
///
/// Returns the plan without the activity.
pub async fn delete_activity(
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(RecordId, RecordId)>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state
        .services
        .day_plans
        .delete_activity(&id, &activity_id)
        .await?;
    Ok(Json(DataResponse { data: plan }))
}

/// POST /api/v1/day-plans/{id}/activities/{activity_id}/toggle
pub async fn toggle_activity(
    State(state): State<AppState>,
    Path((id, activity_id)): Path<(RecordId, RecordId)>,
) -> AppResult<Json<DataResponse<DayPlan>>> {
    let plan = state
        .services
        .day_plans
        .toggle_activity(&id, &activity_id)
        .await?;
    Ok(Json(DataResponse { data: plan }))
}
