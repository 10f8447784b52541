//! Local-mode identity provider.
//!
//! There is exactly one identity. Sign-in and sign-up materialize it on
//! first use and reuse it afterwards; passwords are accepted as given. A
//! session marker key records whether that identity is currently signed in.

use std::sync::Arc;

use async_trait::async_trait;
use wayfarer_core::clock;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_db::models::identity::{Identity, IdentityProfile, UpdateIdentity};

use super::{normalize_email, IdentityProvider};
use crate::kv::{keys, KeyValueStore};
use crate::local::LOCAL_IDENTITY_ID;

const SESSION_MARKER: &str = "active";

pub struct LocalIdentityProvider {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalIdentityProvider {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn load(&self) -> CoreResult<Option<Identity>> {
        let Some(raw) = self.kv.get_item(keys::MOCK_IDENTITY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable local identity, discarding");
                Ok(None)
            }
        }
    }

    async fn save(&self, identity: &Identity) -> CoreResult<()> {
        let raw = serde_json::to_string(identity)?;
        self.kv.set_item(keys::MOCK_IDENTITY, &raw).await
    }

    /// Return the stored identity, creating it from `email`/`profile` if absent,
    /// and mark the session active.
    async fn materialize(&self, email: &str, profile: IdentityProfile) -> CoreResult<Identity> {
        let identity = match self.load().await? {
            Some(existing) => existing,
            None => {
                let now = clock::now();
                let identity = Identity {
                    id: LOCAL_IDENTITY_ID.to_string(),
                    email: normalize_email(email)?,
                    full_name: profile.full_name,
                    phone: profile.phone,
                    avatar_url: profile.avatar_url,
                    created_at: now,
                    updated_at: now,
                };
                self.save(&identity).await?;
                tracing::info!(email = %identity.email, "Local identity created");
                identity
            }
        };
        self.kv.set_item(keys::SESSION, SESSION_MARKER).await?;
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn restore_session(&self) -> CoreResult<Option<Identity>> {
        if self.kv.get_item(keys::SESSION).await?.is_none() {
            return Ok(None);
        }
        self.load().await
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        profile: IdentityProfile,
    ) -> CoreResult<Identity> {
        self.materialize(email, profile).await
    }

    async fn sign_in(&self, email: &str, _password: &str) -> CoreResult<Identity> {
        self.materialize(email, IdentityProfile::default()).await
    }

    async fn sign_out(&self) -> CoreResult<()> {
        self.kv.remove_item(keys::SESSION).await
    }

    async fn update(&self, current: &Identity, changes: UpdateIdentity) -> CoreResult<Identity> {
        let mut identity = self
            .load()
            .await?
            .filter(|stored| stored.id == current.id)
            .ok_or_else(CoreError::no_identity)?;

        if let Some(email) = changes.email {
            identity.email = normalize_email(&email)?;
        }
        if let Some(full_name) = changes.full_name {
            identity.full_name = Some(full_name);
        }
        if let Some(phone) = changes.phone {
            identity.phone = Some(phone);
        }
        if let Some(avatar_url) = changes.avatar_url {
            identity.avatar_url = Some(avatar_url);
        }
        identity.updated_at = clock::after(identity.updated_at);

        self.save(&identity).await?;
        Ok(identity)
    }

    async fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        tracing::debug!(email, "Password reset requested in local mode, nothing to send");
        Ok(())
    }

    async fn complete_password_reset(&self, _token: &str, _new_password: &str) -> CoreResult<()> {
        Ok(())
    }
}
