use axum::routing::get;
use axum::Router;

use crate::handlers::mode;
use crate::state::AppState;

/// `GET /mode` -> current storage mode.
pub fn router() -> Router<AppState> {
    Router::new().route("/mode", get(mode::get_mode))
}
