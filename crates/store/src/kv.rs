//! Flat string key-value store underlying local mode and client-side state.
//!
//! Two implementations:
//! - [`MemoryKv`] -- process memory, used by tests and ephemeral runs.
//! - [`FileKv`] -- one file per key under a directory, written atomically.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use wayfarer_core::error::{CoreError, CoreResult};

/// Storage keys shared by the local adapters and the auth service.
pub mod keys {
    pub const TRIPS: &str = "wayfarer.trips";
    pub const DAY_PLANS: &str = "wayfarer.day_plans";
    pub const STORIES: &str = "wayfarer.stories";
    /// Id of the trip the client currently has open.
    pub const ACTIVE_TRIP: &str = "wayfarer.active_trip";
    /// The single local-mode identity.
    pub const MOCK_IDENTITY: &str = "wayfarer.mock_identity";
    /// Session marker (local) or session token (remote).
    pub const SESSION: &str = "wayfarer.session";
}

/// Flat string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get_item(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Key-value store keeping each key in `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_failure(action: &str, key: &str, err: std::io::Error) -> CoreError {
    CoreError::BackendFailure(format!("Failed to {action} local key '{key}': {err}"))
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_failure("read", key, e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_failure("prepare", key, e))?;

        let target = self.path_for(key);
        let staging = target.with_extension("json.tmp");
        tokio::fs::write(&staging, value)
            .await
            .map_err(|e| io_failure("write", key, e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| io_failure("write", key, e))
    }

    async fn remove_item(&self, key: &str) -> CoreResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("remove", key, e)),
        }
    }
}
