use std::path::PathBuf;
use std::sync::Arc;

use wayfarer_core::mode::StorageMode;
use wayfarer_db::DbPool;
use wayfarer_store::Services;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the services are built once at start-up.
#[derive(Clone)]
pub struct AppState {
    /// Entity and auth services for the resolved storage mode.
    pub services: Arc<Services>,
    /// Remote connection pool, `None` in local mode.
    pub pool: Option<DbPool>,
    /// Directory served under `/files` (remote mode only).
    pub files_dir: Option<PathBuf>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn mode(&self) -> StorageMode {
        self.services.mode
    }
}
