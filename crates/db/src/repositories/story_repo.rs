//! Repository for the `stories` table.

use sqlx::PgPool;
use wayfarer_core::types::Timestamp;

use crate::models::story::Story;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, trip_id, title, content, image_url, location, created_at, updated_at";

/// Provides owner-scoped CRUD operations for stories.
pub struct StoryRepo;

impl StoryRepo {
    /// Insert a fully built story, returning the stored row.
    pub async fn insert(pool: &PgPool, story: &Story) -> Result<Story, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (id, user_id, trip_id, title, content, image_url, location,
                                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(&story.id)
            .bind(&story.user_id)
            .bind(&story.trip_id)
            .bind(&story.title)
            .bind(&story.content)
            .bind(&story.image_url)
            .bind(&story.location)
            .bind(story.created_at)
            .bind(story.updated_at)
            .fetch_one(pool)
            .await
    }

    /// List an owner's stories, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Story>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stories WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List an owner's stories attached to one trip, most recent first.
    pub async fn list_by_trip(
        pool: &PgPool,
        trip_id: &str,
        user_id: &str,
    ) -> Result<Vec<Story>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stories
             WHERE trip_id = $1 AND user_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(trip_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of an owner's stories by id.
    pub async fn find_for_user(
        pool: &PgPool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a story's mutable columns if `updated_at` still equals
    /// `expected_updated_at`. Returns `None` if missing, foreign, or stale.
    pub async fn update_if_unchanged(
        pool: &PgPool,
        story: &Story,
        expected_updated_at: Timestamp,
    ) -> Result<Option<Story>, sqlx::Error> {
        let query = format!(
            "UPDATE stories SET
                trip_id = $3,
                title = $4,
                content = $5,
                image_url = $6,
                location = $7,
                updated_at = $8
             WHERE id = $1 AND user_id = $2 AND updated_at = $9
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(&story.id)
            .bind(&story.user_id)
            .bind(&story.trip_id)
            .bind(&story.title)
            .bind(&story.content)
            .bind(&story.image_url)
            .bind(&story.location)
            .bind(story.updated_at)
            .bind(expected_updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete one of an owner's stories. Returns `true` if a row was removed.
    pub async fn delete_for_user(pool: &PgPool, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
