//! Remote-mode identity provider backed by the `identities` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::{clock, ids};
use wayfarer_db::models::identity::{Identity, IdentityProfile, IdentityRecord, UpdateIdentity};
use wayfarer_db::models::password_reset::CreatePasswordReset;
use wayfarer_db::repositories::{IdentityRepo, PasswordResetRepo};
use wayfarer_db::DbPool;

use super::password::{hash_password, validate_password_strength, verify_password};
use super::session::{issue_session_token, validate_session_token, SessionConfig};
use super::{normalize_email, IdentityProvider};
use crate::kv::{keys, KeyValueStore};
use crate::remote::backend_error;

/// Lifetime of a password reset token.
const RESET_TOKEN_TTL_MINS: i64 = 60;

fn invalid_credentials() -> CoreError {
    CoreError::Unauthenticated("Invalid login credentials".into())
}

pub struct RemoteIdentityProvider {
    pool: DbPool,
    kv: Arc<dyn KeyValueStore>,
    session: SessionConfig,
}

impl RemoteIdentityProvider {
    pub fn new(pool: DbPool, kv: Arc<dyn KeyValueStore>, session: SessionConfig) -> Self {
        Self { pool, kv, session }
    }

    async fn start_session(&self, record: IdentityRecord) -> CoreResult<Identity> {
        let token = issue_session_token(&record.id, &record.email, &self.session)?;
        self.kv.set_item(keys::SESSION, &token).await?;
        Ok(record.into_identity())
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn restore_session(&self) -> CoreResult<Option<Identity>> {
        let Some(token) = self.kv.get_item(keys::SESSION).await? else {
            return Ok(None);
        };

        let claims = match validate_session_token(&token, &self.session) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::info!(error = %e, "Discarding stored session");
                self.kv.remove_item(keys::SESSION).await?;
                return Ok(None);
            }
        };

        match IdentityRepo::find_by_id(&self.pool, &claims.sub)
            .await
            .map_err(backend_error)?
        {
            Some(record) => Ok(Some(record.into_identity())),
            None => {
                self.kv.remove_item(keys::SESSION).await?;
                Ok(None)
            }
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: IdentityProfile,
    ) -> CoreResult<Identity> {
        let email = normalize_email(email)?;
        validate_password_strength(password)?;

        let now = clock::now();
        let record = IdentityRecord {
            id: ids::remote_id(),
            email,
            password_hash: hash_password(password)?,
            full_name: profile.full_name,
            phone: profile.phone,
            avatar_url: profile.avatar_url,
            created_at: now,
            updated_at: now,
        };

        let created = IdentityRepo::create(&self.pool, &record)
            .await
            .map_err(|e| match backend_error(e) {
                CoreError::Conflict(_) => CoreError::Conflict("User already registered".into()),
                other => other,
            })?;
        tracing::info!(identity_id = %created.id, "Identity registered");
        self.start_session(created).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> CoreResult<Identity> {
        let email = normalize_email(email).map_err(|_| invalid_credentials())?;
        let record = IdentityRepo::find_by_email(&self.pool, &email)
            .await
            .map_err(backend_error)?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &record.password_hash)? {
            return Err(invalid_credentials());
        }
        self.start_session(record).await
    }

    async fn sign_out(&self) -> CoreResult<()> {
        self.kv.remove_item(keys::SESSION).await
    }

    async fn update(&self, current: &Identity, changes: UpdateIdentity) -> CoreResult<Identity> {
        let mut identity = current.clone();
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
        identity.updated_at = clock::after(current.updated_at);

        let new_hash = match changes.password.as_deref() {
            Some(password) => {
                validate_password_strength(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let record = IdentityRepo::update_profile(&self.pool, &identity)
            .await
            .map_err(backend_error)?
            .ok_or_else(CoreError::no_identity)?;

        if let Some(hash) = new_hash {
            IdentityRepo::update_password(&self.pool, &record.id, &hash, record.updated_at)
                .await
                .map_err(backend_error)?;
        }
        Ok(record.into_identity())
    }

    async fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        let Ok(email) = normalize_email(email) else {
            return Ok(());
        };
        let Some(record) = IdentityRepo::find_by_email(&self.pool, &email)
            .await
            .map_err(backend_error)?
        else {
            tracing::debug!(email = %email, "Password reset requested for unknown email");
            return Ok(());
        };

        let token = ids::reset_token();
        PasswordResetRepo::create(
            &self.pool,
            &CreatePasswordReset {
                id: ids::remote_id(),
                identity_id: record.id.clone(),
                token_hash: ids::reset_token_digest(&token),
                expires_at: clock::now() + Duration::minutes(RESET_TOKEN_TTL_MINS),
            },
        )
        .await
        .map_err(backend_error)?;

        // Delivery is out of band; the token is only ever logged here.
        tracing::debug!(identity_id = %record.id, reset_token = %token, "Password reset token issued");
        Ok(())
    }

    async fn complete_password_reset(&self, token: &str, new_password: &str) -> CoreResult<()> {
        validate_password_strength(new_password)?;

        let reset = PasswordResetRepo::consume(&self.pool, &ids::reset_token_digest(token), clock::now())
            .await
            .map_err(backend_error)?
            .ok_or_else(|| CoreError::Unauthenticated("Reset token is invalid or expired".into()))?;

        let hash = hash_password(new_password)?;
        let updated = IdentityRepo::update_password(&self.pool, &reset.identity_id, &hash, clock::now())
            .await
            .map_err(backend_error)?;
        if !updated {
            return Err(CoreError::not_found("Identity", reset.identity_id));
        }
        tracing::info!(identity_id = %reset.identity_id, "Password reset completed");
        Ok(())
    }
}
