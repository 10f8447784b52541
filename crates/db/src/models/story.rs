//! Travel story model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayfarer_core::types::{RecordId, Timestamp};

/// A story row from the `stories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Story {
    pub id: RecordId,
    pub user_id: RecordId,
    pub trip_id: Option<RecordId>,
    pub title: Option<String>,
    pub content: String,
    /// Public URL (remote) or inline `data:` URL (local).
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new story.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStory {
    pub trip_id: Option<RecordId>,
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// DTO for updating an existing story. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStory {
    pub trip_id: Option<RecordId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}
