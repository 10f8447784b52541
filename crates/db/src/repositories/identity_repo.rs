//! Repository for the `identities` table.

use sqlx::PgPool;
use wayfarer_core::types::Timestamp;

use crate::models::identity::{Identity, IdentityRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, email, password_hash, full_name, phone, avatar_url, created_at, updated_at";

/// Identity primitives backing remote sign-up / sign-in.
pub struct IdentityRepo;

impl IdentityRepo {
    /// Insert a new identity. The email must already be normalized.
    ///
    /// A taken email fails with the `uq_identities_email` unique violation.
    pub async fn create(pool: &PgPool, record: &IdentityRecord) -> Result<IdentityRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO identities (id, email, password_hash, full_name, phone, avatar_url,
                                     created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentityRecord>(&query)
            .bind(&record.id)
            .bind(&record.email)
            .bind(&record.password_hash)
            .bind(&record.full_name)
            .bind(&record.phone)
            .bind(&record.avatar_url)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Find an identity by its normalized email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<IdentityRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE email = $1");
        sqlx::query_as::<_, IdentityRecord>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an identity by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<IdentityRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE id = $1");
        sqlx::query_as::<_, IdentityRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write the profile fields and email of `identity`.
    ///
    /// Returns `None` if no row with that id exists.
    pub async fn update_profile(
        pool: &PgPool,
        identity: &Identity,
    ) -> Result<Option<IdentityRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE identities SET
                email = $2,
                full_name = $3,
                phone = $4,
                avatar_url = $5,
                updated_at = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentityRecord>(&query)
            .bind(&identity.id)
            .bind(&identity.email)
            .bind(&identity.full_name)
            .bind(&identity.phone)
            .bind(&identity.avatar_url)
            .bind(identity.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: &str,
        password_hash: &str,
        updated_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identities SET password_hash = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
