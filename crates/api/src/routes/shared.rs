use axum::routing::get;
use axum::Router;

use crate::handlers::shared;
use crate::state::AppState;

/// Routes mounted at `/shared`. No identity required.
///
/// ```text
/// GET    /{token}     -> get_shared_trip
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{token}", get(shared::get_shared_trip))
}
