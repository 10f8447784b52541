//! Image storage for stories.
//!
//! Remote mode writes files under `DATA_DIR` and hands out public URLs the
//! API serves under `/files`. Local mode has no object store, so images are
//! embedded in the story as `data:` URLs.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use wayfarer_core::error::{CoreError, CoreResult};

/// Content types accepted for story images, with the file extension used.
pub const ACCEPTED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Largest accepted image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Route prefix under which [`FsBlobStore`] files are served.
pub const FILES_ROUTE: &str = "/files";

/// Validate an upload and return the extension for its content type.
pub fn check_image(bytes: &[u8], content_type: &str) -> CoreResult<&'static str> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Image is empty".into()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Image is {} bytes, the limit is {MAX_IMAGE_BYTES}",
            bytes.len()
        )));
    }
    ACCEPTED_IMAGE_TYPES
        .iter()
        .find(|(ty, _)| ty.eq_ignore_ascii_case(content_type.trim()))
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            CoreError::Validation(format!("Unsupported image type '{content_type}'"))
        })
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and return the reference to save on the record.
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> CoreResult<String>;

    /// Public URL for an object path.
    fn public_url(&self, path: &str) -> String;

    /// Object path behind a reference this store handed out, if it has one.
    fn object_path<'a>(&self, reference: &'a str) -> Option<&'a str>;

    /// Delete the object behind a reference returned by [`BlobStore::upload`].
    /// Unknown references are ignored.
    async fn remove(&self, reference: &str) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve an object path below the root, rejecting traversal.
    fn resolve(&self, path: &str) -> CoreResult<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(CoreError::Validation(format!("Invalid object path '{path}'")));
        }
        Ok(self.root.join(relative))
    }

    fn url_prefix(&self) -> String {
        format!("{}{FILES_ROUTE}/", self.base_url)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8], _content_type: &str) -> CoreResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::BackendFailure(format!("Failed to create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| CoreError::BackendFailure(format!("Failed to write {path}: {e}")))?;
        tracing::debug!(path, size = bytes.len(), "Stored image");
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{path}", self.url_prefix())
    }

    fn object_path<'a>(&self, reference: &'a str) -> Option<&'a str> {
        reference.strip_prefix(&self.url_prefix())
    }

    async fn remove(&self, reference: &str) -> CoreResult<()> {
        let Some(path) = self.object_path(reference) else {
            return Ok(());
        };
        match tokio::fs::remove_file(self.resolve(path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::BackendFailure(format!("Failed to remove {path}: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

/// Embeds images in the record itself as `data:` URLs.
#[derive(Debug, Default)]
pub struct InlineBlobStore;

#[async_trait]
impl BlobStore for InlineBlobStore {
    async fn upload(&self, _path: &str, bytes: &[u8], content_type: &str) -> CoreResult<String> {
        Ok(format!("data:{content_type};base64,{}", STANDARD.encode(bytes)))
    }

    fn public_url(&self, path: &str) -> String {
        path.to_string()
    }

    fn object_path<'a>(&self, _reference: &'a str) -> Option<&'a str> {
        None
    }

    async fn remove(&self, _reference: &str) -> CoreResult<()> {
        Ok(())
    }
}
