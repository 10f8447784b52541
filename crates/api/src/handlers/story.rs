//! Handlers for the `/stories` resource.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use wayfarer_core::types::RecordId;
use wayfarer_db::models::story::{CreateStory, Story, UpdateStory};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    /// Value to store in a story's `image_url`.
    pub url: String,
}

/// POST /api/v1/stories
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStory>,
) -> AppResult<(StatusCode, Json<DataResponse<Story>>)> {
    let story = state.services.stories.create(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: story })))
}

/// GET /api/v1/stories
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Story>>>> {
    let stories = state.services.stories.get_all().await?;
    Ok(Json(DataResponse { data: stories }))
}

/// GET /api/v1/trips/{id}/stories
pub async fn list_by_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<RecordId>,
) -> AppResult<Json<DataResponse<Vec<Story>>>> {
    let stories = state.services.stories.get_by_trip(&trip_id).await?;
    Ok(Json(DataResponse { data: stories }))
}

/// GET /api/v1/stories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<Json<DataResponse<Story>>> {
    let story = state.services.stories.get_by_id(&id).await?;
    Ok(Json(DataResponse { data: story }))
}

/// PUT /api/v1/stories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<UpdateStory>,
) -> AppResult<Json<DataResponse<Story>>> {
    let story = state.services.stories.update(&id, input).await?;
    Ok(Json(DataResponse { data: story }))
}

/// DELETE /api/v1/stories/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<StatusCode> {
    state.services.stories.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/stories/images
///
/// The request body is the raw image; `Content-Type` names its format.
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedImage>>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("Missing Content-Type header".into()))?;

    let url = state
        .services
        .stories
        .upload_image(&body, &content_type)
        .await?;
    tracing::debug!(content_type = %content_type, bytes = body.len(), "Story image uploaded");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadedImage { url },
        }),
    ))
}
