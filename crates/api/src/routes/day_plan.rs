//! Route definitions for the `/day-plans` resource and its activities.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::day_plan;
use crate::state::AppState;

/// Routes mounted at `/day-plans`.
///
/// ```text
/// GET    /{id}                                    -> get_by_id
/// PUT    /{id}                                    -> update
/// DELETE /{id}                                    -> delete
/// POST   /{id}/activities                         -> add_activity
/// PUT    /{id}/activities/{activity_id}           -> update_activity
/// DELETE /{id}/activities/{activity_id}           -> delete_activity
/// POST   /{id}/activities/{activity_id}/toggle    -> toggle_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(day_plan::get_by_id)
                .put(day_plan::update)
                .delete(day_plan::delete),
        )
        .route("/{id}/activities", post(day_plan::add_activity))
        .route(
            "/{id}/activities/{activity_id}",
            put(day_plan::update_activity).delete(day_plan::delete_activity),
        )
        .route(
            "/{id}/activities/{activity_id}/toggle",
            post(day_plan::toggle_activity),
        )
}
