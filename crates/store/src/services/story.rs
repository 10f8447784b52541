//! Story entity service.

use std::sync::Arc;

use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::{clock, ids};
use wayfarer_db::models::story::{CreateStory, Story, UpdateStory};

use crate::blob::{check_image, BlobStore};
use crate::store::StoryStore;

/// A story needs text or a picture.
fn require_body(content: &str, image_url: Option<&str>) -> CoreResult<()> {
    if content.trim().is_empty() && image_url.map_or(true, |url| url.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Story needs content or an image".into(),
        ));
    }
    Ok(())
}

/// Object path prefix for one owner's story images.
fn image_dir(owner: &str) -> String {
    format!("stories/{owner}/")
}

pub struct StoryService {
    store: Arc<dyn StoryStore>,
    blobs: Arc<dyn BlobStore>,
}

impl StoryService {
    pub fn new(store: Arc<dyn StoryStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// All stories of the current owner, newest first.
    pub async fn get_all(&self) -> CoreResult<Vec<Story>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> CoreResult<Story> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Story", id))
    }

    pub async fn get_by_trip(&self, trip_id: &str) -> CoreResult<Vec<Story>> {
        self.store.list_by_trip(trip_id).await
    }

    pub async fn create(&self, input: CreateStory) -> CoreResult<Story> {
        require_body(&input.content, input.image_url.as_deref())?;

        let now = clock::now();
        let story = Story {
            id: self.store.new_id(),
            user_id: self.store.owner_id()?,
            trip_id: input.trip_id,
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            location: input.location,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(story).await?;
        tracing::info!(story_id = %created.id, "Story created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, changes: UpdateStory) -> CoreResult<Story> {
        let current = self.get_by_id(id).await?;

        let expected = current.updated_at;
        let mut story = current;
        if let Some(trip_id) = changes.trip_id {
            story.trip_id = Some(trip_id);
        }
        if let Some(title) = changes.title {
            story.title = Some(title);
        }
        if let Some(content) = changes.content {
            story.content = content;
        }
        if let Some(image_url) = changes.image_url {
            story.image_url = Some(image_url);
        }
        if let Some(location) = changes.location {
            story.location = Some(location);
        }
        require_body(&story.content, story.image_url.as_deref())?;

        story.updated_at = clock::after(expected);
        self.store.replace(story, expected).await
    }

    /// Delete a story. Its image stays until [`StoryService::remove_image`].
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.store.delete(id).await? {
            return Err(CoreError::not_found("Story", id));
        }
        tracing::info!(story_id = %id, "Story deleted");
        Ok(())
    }

    /// Store an image and return the reference to put in `image_url`.
    ///
    /// Remote mode returns a public URL; local mode an inline `data:` URL.
    pub async fn upload_image(&self, bytes: &[u8], content_type: &str) -> CoreResult<String> {
        let extension = check_image(bytes, content_type)?;
        let owner = self.store.owner_id()?;
        let path = format!("{}{}.{extension}", image_dir(&owner), ids::local_id());
        self.blobs.upload(&path, bytes, content_type).await
    }

    /// Delete an image uploaded by the current owner.
    ///
    /// Stored images of other owners are reported as not found and left in
    /// place. Inline and foreign references have nothing to delete.
    pub async fn remove_image(&self, reference: &str) -> CoreResult<()> {
        let owner = self.store.owner_id()?;
        if let Some(path) = self.blobs.object_path(reference) {
            if !path.starts_with(&image_dir(&owner)) {
                tracing::warn!(owner = %owner, path, "Refused to remove another owner's image");
                return Err(CoreError::not_found("Image", reference));
            }
        }
        self.blobs.remove(reference).await
    }
}
