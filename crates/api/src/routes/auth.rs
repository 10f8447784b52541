//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /sign-up                    -> sign_up
/// POST   /sign-in                    -> sign_in
/// POST   /sign-out                   -> sign_out
/// POST   /password-reset             -> request_password_reset
/// POST   /password-reset/complete    -> complete_password_reset
/// GET    /me                         -> me
/// PUT    /me                         -> update_me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/password-reset", post(auth::request_password_reset))
        .route(
            "/password-reset/complete",
            post(auth::complete_password_reset),
        )
        .route("/me", get(auth::me).put(auth::update_me))
}
