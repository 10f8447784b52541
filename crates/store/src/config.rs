use std::path::PathBuf;

use wayfarer_core::mode::StorageMode;

use crate::auth::session::{SessionConfig, DEFAULT_SESSION_EXPIRY_HOURS};

/// Persistence configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Requested mode; remote is only used if it also resolves.
    pub mode: StorageMode,
    pub remote_url: Option<String>,
    /// Remote credential; also signs remote sessions.
    pub remote_key: Option<String>,
    pub session_expiry_hours: i64,
    /// Root for the file-backed key-value store and uploaded images.
    pub data_dir: PathBuf,
    /// Base URL under which uploaded images are publicly reachable.
    pub public_base_url: String,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `STORAGE_MODE`         | `local`                  |
    /// | `REMOTE_DATABASE_URL`  | --                       |
    /// | `REMOTE_API_KEY`       | --                       |
    /// | `SESSION_EXPIRY_HOURS` | `168`                    |
    /// | `DATA_DIR`             | `./data`                 |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`  |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_EXPIRY_HOURS` is not a valid i64.
    pub fn from_env() -> Self {
        let mode = StorageMode::from_flag(&std::env::var("STORAGE_MODE").unwrap_or_default());

        let session_expiry_hours: i64 = std::env::var("SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("SESSION_EXPIRY_HOURS must be a valid i64");

        Self {
            mode,
            remote_url: non_empty_var("REMOTE_DATABASE_URL"),
            remote_key: non_empty_var("REMOTE_API_KEY"),
            session_expiry_hours,
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".into())
                .into(),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        }
    }

    /// Local-mode configuration rooted at `data_dir`.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: StorageMode::Local,
            remote_url: None,
            remote_key: None,
            session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
            data_dir: data_dir.into(),
            public_base_url: "http://localhost:3000".into(),
        }
    }

    /// Session signing settings; empty secret when no remote key is set.
    pub fn session(&self) -> SessionConfig {
        SessionConfig::new(
            self.remote_key.clone().unwrap_or_default(),
            self.session_expiry_hours,
        )
    }

    /// Directory of the file-backed key-value store.
    pub fn kv_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }

    /// Directory of uploaded images.
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
