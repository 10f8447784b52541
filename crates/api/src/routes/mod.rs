pub mod auth;
pub mod day_plan;
pub mod health;
pub mod mode;
pub mod shared;
pub mod story;
pub mod trip;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/sign-up                                    create account, sign in
/// /auth/sign-in                                    sign in
/// /auth/sign-out                                   sign out
/// /auth/password-reset                             request reset token
/// /auth/password-reset/complete                    set new password
/// /auth/me                                         session state, profile update
///
/// /trips                                           list, create
/// /trips/active                                    get, set, clear active trip
/// /trips/{id}                                      get, update, delete
/// /trips/{id}/itinerary                            replace itinerary (PUT)
/// /trips/{id}/status                               change status (PUT)
/// /trips/{id}/share                                share (POST), unshare (DELETE)
/// /trips/{id}/day-plans                            list, create
/// /trips/{id}/day-plans/from-itinerary             materialize plans (POST)
/// /trips/{id}/day-plans/by-number/{n}              plan for day n
/// /trips/{id}/stories                              stories of a trip
///
/// /day-plans/{id}                                  get, update, delete
/// /day-plans/{id}/activities                       add activity (POST)
/// /day-plans/{id}/activities/{activity_id}         update, delete
/// /day-plans/{id}/activities/{activity_id}/toggle  flip completed (POST)
///
/// /stories                                         list, create
/// /stories/images                                  upload image (POST, raw body)
/// /stories/{id}                                    get, update, delete
///
/// /shared/{token}                                  public shared trip view
/// /mode                                            current storage mode
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/trips", trip::router())
        .nest("/day-plans", day_plan::router())
        .nest("/stories", story::router())
        .nest("/shared", shared::router())
        .merge(mode::router())
}
