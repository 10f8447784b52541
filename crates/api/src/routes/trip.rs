//! Route definitions for the `/trips` resource.
//!
//! Also nests the trip-scoped day plan and story listings under
//! `/trips/{id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{day_plan, story, trip};
use crate::state::AppState;

/// Routes mounted at `/trips`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /active                             -> get_active
/// PUT    /active                             -> set_active
/// DELETE /active                             -> clear_active
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
/// PUT    /{id}/itinerary                     -> update_itinerary
/// PUT    /{id}/status                        -> set_status
/// POST   /{id}/share                         -> share
/// DELETE /{id}/share                         -> unshare
///
/// GET    /{id}/day-plans                     -> day_plan::list_by_trip
/// POST   /{id}/day-plans                     -> day_plan::create
/// POST   /{id}/day-plans/from-itinerary      -> day_plan::create_from_itinerary
/// GET    /{id}/day-plans/by-number/{n}       -> day_plan::get_by_number
///
/// GET    /{id}/stories                       -> story::list_by_trip
/// ```
pub fn router() -> Router<AppState> {
    let day_plan_routes = Router::new()
        .route("/", get(day_plan::list_by_trip).post(day_plan::create))
        .route("/from-itinerary", post(day_plan::create_from_itinerary))
        .route("/by-number/{n}", get(day_plan::get_by_number));

    Router::new()
        .route("/", get(trip::list).post(trip::create))
        .route(
            "/active",
            get(trip::get_active)
                .put(trip::set_active)
                .delete(trip::clear_active),
        )
        .route(
            "/{id}",
            get(trip::get_by_id).put(trip::update).delete(trip::delete),
        )
        .route("/{id}/itinerary", put(trip::update_itinerary))
        .route("/{id}/status", put(trip::set_status))
        .route("/{id}/share", post(trip::share).delete(trip::unshare))
        .route("/{id}/stories", get(story::list_by_trip))
        .nest("/{id}/day-plans", day_plan_routes)
}
