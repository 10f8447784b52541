//! Password reset request model.

use sqlx::FromRow;
use wayfarer_core::types::{RecordId, Timestamp};

/// A row from the `password_resets` table. Only the token digest is stored.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: RecordId,
    pub identity_id: RecordId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for recording a new reset request.
pub struct CreatePasswordReset {
    pub id: RecordId,
    pub identity_id: RecordId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
