//! Repository for the `password_resets` table.

use sqlx::PgPool;
use wayfarer_core::types::Timestamp;

use crate::models::password_reset::{CreatePasswordReset, PasswordReset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, identity_id, token_hash, expires_at, used_at, created_at";

/// Stores hashed reset tokens.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Record a reset request.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePasswordReset,
    ) -> Result<PasswordReset, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_resets (id, identity_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(&input.id)
            .bind(&input.identity_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Atomically consume an unused, unexpired reset by token digest.
    ///
    /// Returns the consumed row, or `None` if the token is unknown, used, or expired.
    pub async fn consume(
        pool: &PgPool,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "UPDATE password_resets SET used_at = $2
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
