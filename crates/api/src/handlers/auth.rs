//! Handlers for the `/auth` resource.
//!
//! The process holds one auth session, so these act on the shared
//! [`AuthService`](wayfarer_store::auth::AuthService) rather than a
//! per-request bearer token.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use wayfarer_db::models::identity::{Identity, IdentityProfile, UpdateIdentity};
use wayfarer_store::auth::state::AuthSnapshot;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: IdentityProfile,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletePasswordResetRequest {
    pub token: String,
    pub new_password: String,
}

/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Identity>>)> {
    let identity = state
        .services
        .auth
        .sign_up(&input.email, &input.password, input.profile)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: identity })))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<SignInRequest>,
) -> AppResult<Json<DataResponse<Identity>>> {
    let identity = state
        .services
        .auth
        .sign_in(&input.email, &input.password)
        .await?;
    Ok(Json(DataResponse { data: identity }))
}

/// POST /api/v1/auth/sign-out
pub async fn sign_out(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.services.auth.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/password-reset
///
/// Answers 202 whether or not the address is registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .auth
        .request_password_reset(&input.email)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/password-reset/complete
pub async fn complete_password_reset(
    State(state): State<AppState>,
    Json(input): Json<CompletePasswordResetRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .auth
        .complete_password_reset(&input.token, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// Re-checks the stored session and returns the resulting auth state.
pub async fn me(State(state): State<AppState>) -> AppResult<Json<DataResponse<AuthSnapshot>>> {
    state.services.auth.get_current_identity().await?;
    Ok(Json(DataResponse {
        data: state.services.auth.snapshot(),
    }))
}

/// PUT /api/v1/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    Json(input): Json<UpdateIdentity>,
) -> AppResult<Json<DataResponse<Identity>>> {
    let identity = state.services.auth.update_identity(input).await?;
    Ok(Json(DataResponse { data: identity }))
}
