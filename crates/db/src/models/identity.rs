//! Identity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayfarer_core::types::{RecordId, Timestamp};

/// Public identity, safe to hand to callers and to cache.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Identity {
    pub id: RecordId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full row from the `identities` table.
///
/// Contains the password hash -- NEVER serialize this. Use
/// [`IdentityRecord::into_identity`] for anything leaving the auth layer.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRecord {
    pub id: RecordId,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl IdentityRecord {
    /// Drop the password hash.
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Display metadata supplied at sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for updating the signed-in identity. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIdentity {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}
