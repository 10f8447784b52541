//! Cached authentication state.

use serde::Serialize;
use tokio::sync::watch;
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_core::types::RecordId;
use wayfarer_db::models::identity::Identity;

/// Where the auth service is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// No session check has completed yet.
    Unknown,
    /// A session check or auth mutation is in flight.
    Loading,
    Authenticated,
    Anonymous,
}

/// Status plus the last known identity.
///
/// The identity survives `Loading` so scoped queries keep working while an
/// auth call is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSnapshot {
    pub status: AuthStatus,
    pub identity: Option<Identity>,
}

impl AuthSnapshot {
    pub fn unknown() -> Self {
        Self {
            status: AuthStatus::Unknown,
            identity: None,
        }
    }

    /// Settled state for the outcome of an auth call.
    pub fn resolved(identity: Option<Identity>) -> Self {
        let status = if identity.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        };
        Self { status, identity }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, AuthStatus::Unknown | AuthStatus::Loading)
    }
}

/// Read-only view of the current identity, handed to remote stores.
#[derive(Debug, Clone)]
pub struct IdentityScope {
    state: watch::Receiver<AuthSnapshot>,
}

impl IdentityScope {
    pub fn new(state: watch::Receiver<AuthSnapshot>) -> Self {
        Self { state }
    }

    /// Id of the signed-in identity, or `Unauthenticated`.
    pub fn user_id(&self) -> CoreResult<RecordId> {
        self.state
            .borrow()
            .identity
            .as_ref()
            .map(|identity| identity.id.clone())
            .ok_or_else(CoreError::no_identity)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wayfarer_core::clock;

    use super::*;

    fn identity() -> Identity {
        let now = clock::now();
        Identity {
            id: "u1".into(),
            email: "ana@example.com".into(),
            full_name: None,
            phone: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resolved_status_follows_identity() {
        assert_eq!(AuthSnapshot::resolved(None).status, AuthStatus::Anonymous);
        assert!(AuthSnapshot::resolved(Some(identity())).is_authenticated());
        assert!(AuthSnapshot::unknown().is_loading());
    }

    #[test]
    fn scope_tracks_state_changes() {
        let (tx, rx) = watch::channel(AuthSnapshot::unknown());
        let scope = IdentityScope::new(rx);
        assert_matches!(scope.user_id(), Err(CoreError::Unauthenticated(_)));

        tx.send_replace(AuthSnapshot::resolved(Some(identity())));
        assert_eq!(scope.user_id().unwrap(), "u1");

        tx.send_modify(|s| s.status = AuthStatus::Loading);
        assert_eq!(scope.user_id().unwrap(), "u1");

        tx.send_replace(AuthSnapshot::resolved(None));
        assert_matches!(scope.user_id(), Err(CoreError::Unauthenticated(_)));
    }
}
