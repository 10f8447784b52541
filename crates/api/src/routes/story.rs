//! Route definitions for the `/stories` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use wayfarer_store::blob::MAX_IMAGE_BYTES;

use crate::handlers::story;
use crate::state::AppState;

/// Routes mounted at `/stories`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// POST   /images      -> upload_image (raw body, Content-Type header)
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(story::list).post(story::create))
        // Let oversized uploads reach the size check for a 400 instead of 413.
        .route(
            "/images",
            post(story::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES * 2)),
        )
        .route(
            "/{id}",
            get(story::get_by_id).put(story::update).delete(story::delete),
        )
}
