use axum::extract::State;
use axum::Json;
use serde::Serialize;
use wayfarer_core::mode::StorageMode;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: StorageMode,
    pub remote_available: bool,
}

/// GET /api/v1/mode
pub async fn get_mode(State(state): State<AppState>) -> Json<DataResponse<ModeResponse>> {
    let mode = state.mode();
    Json(DataResponse {
        data: ModeResponse {
            mode,
            remote_available: mode == StorageMode::Remote,
        },
    })
}
