//! Start-up decision between the remote and local substrates.
//!
//! Remote mode needs three things: the `remote` flag, real (non-placeholder)
//! settings, and a database that answers a health check. Any miss is logged
//! and the process runs in local mode. The decision is made once.

use wayfarer_core::mode::{check_remote_settings, StorageMode};
use wayfarer_db::DbPool;

use crate::config::StoreConfig;

#[derive(Clone)]
pub struct ModeResolver {
    mode: StorageMode,
    pool: Option<DbPool>,
}

impl ModeResolver {
    pub async fn resolve(config: &StoreConfig) -> Self {
        if let Err(reason) = check_remote_settings(
            config.mode,
            config.remote_url.as_deref(),
            config.remote_key.as_deref(),
        ) {
            if config.mode == StorageMode::Remote {
                tracing::warn!(reason = %reason, "Remote storage unusable, falling back to local");
            } else {
                tracing::info!("Using local storage");
            }
            return Self::local();
        }

        // check_remote_settings guarantees the URL is present.
        let url = config.remote_url.as_deref().unwrap_or_default();
        match Self::connect(url).await {
            Ok(pool) => {
                tracing::info!("Using remote storage");
                Self::remote(pool)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote database unreachable, falling back to local");
                Self::local()
            }
        }
    }

    async fn connect(url: &str) -> Result<DbPool, sqlx::Error> {
        let pool = wayfarer_db::create_pool(url).await?;
        wayfarer_db::health_check(&pool).await?;
        Ok(pool)
    }

    pub fn local() -> Self {
        Self {
            mode: StorageMode::Local,
            pool: None,
        }
    }

    /// Remote mode over an already connected pool.
    pub fn remote(pool: DbPool) -> Self {
        Self {
            mode: StorageMode::Remote,
            pool: Some(pool),
        }
    }

    pub fn is_remote_available(&self) -> bool {
        self.pool.is_some()
    }

    pub fn current_mode(&self) -> StorageMode {
        self.mode
    }

    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }
}
