//! Authentication: identity providers per mode plus the [`AuthService`]
//! state machine shared by every caller.
//!
//! The service caches the last known identity and moves through
//! `Unknown -> Loading -> Authenticated | Anonymous`. Every mutating call
//! re-enters `Loading`; a failed call restores the state it started from.
//! Each successful transition is published on the [`EventBus`].

pub mod local;
pub mod password;
pub mod remote;
pub mod session;
pub mod state;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use wayfarer_core::error::{CoreError, CoreResult};
use wayfarer_db::models::identity::{Identity, IdentityProfile, UpdateIdentity};
use wayfarer_events::{AuthEvent, AuthEventKind, EventBus};

use state::{AuthSnapshot, AuthStatus, IdentityScope};

/// Lowercase and trim an email address, rejecting obviously invalid ones.
pub fn normalize_email(email: &str) -> CoreResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(CoreError::Validation("Invalid email address".into())),
    }
}

/// Substrate-specific identity operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity of the persisted session, if it is still valid.
    async fn restore_session(&self) -> CoreResult<Option<Identity>>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: IdentityProfile,
    ) -> CoreResult<Identity>;

    async fn sign_in(&self, email: &str, password: &str) -> CoreResult<Identity>;

    async fn sign_out(&self) -> CoreResult<()>;

    async fn update(&self, current: &Identity, changes: UpdateIdentity) -> CoreResult<Identity>;

    /// Always succeeds for unknown emails so callers cannot discover accounts.
    async fn request_password_reset(&self, email: &str) -> CoreResult<()>;

    async fn complete_password_reset(&self, token: &str, new_password: &str) -> CoreResult<()>;
}

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthSnapshot>,
    events: Arc<EventBus>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, events: Arc<EventBus>) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::unknown());
        Self {
            provider,
            state,
            events,
        }
    }

    /// Enter `Loading`, returning the state to restore on failure.
    fn begin(&self) -> AuthSnapshot {
        let previous = self.state.borrow().clone();
        self.state.send_modify(|s| s.status = AuthStatus::Loading);
        previous
    }

    fn settle(&self, identity: Option<Identity>, kind: AuthEventKind) {
        self.state.send_replace(AuthSnapshot::resolved(identity.clone()));
        self.events.publish(AuthEvent::new(kind, identity));
    }

    fn restore<T>(&self, previous: AuthSnapshot, err: CoreError) -> CoreResult<T> {
        self.state.send_replace(previous);
        Err(err)
    }

    /// Resolve the persisted session. Never fails: an unreadable session
    /// settles as anonymous.
    pub async fn initialize(&self) -> Option<Identity> {
        self.begin();
        let identity = match self.provider.restore_session().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed, continuing signed out");
                None
            }
        };
        tracing::info!(authenticated = identity.is_some(), "Initial session resolved");
        self.settle(identity.clone(), AuthEventKind::InitialSession);
        identity
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: IdentityProfile,
    ) -> CoreResult<Identity> {
        let previous = self.begin();
        match self.provider.sign_up(email, password, profile).await {
            Ok(identity) => {
                self.settle(Some(identity.clone()), AuthEventKind::SignedIn);
                Ok(identity)
            }
            Err(e) => self.restore(previous, e),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> CoreResult<Identity> {
        let previous = self.begin();
        match self.provider.sign_in(email, password).await {
            Ok(identity) => {
                tracing::info!(identity_id = %identity.id, "Signed in");
                self.settle(Some(identity.clone()), AuthEventKind::SignedIn);
                Ok(identity)
            }
            Err(e) => self.restore(previous, e),
        }
    }

    pub async fn sign_out(&self) -> CoreResult<()> {
        let previous = self.begin();
        match self.provider.sign_out().await {
            Ok(()) => {
                self.settle(None, AuthEventKind::SignedOut);
                Ok(())
            }
            Err(e) => self.restore(previous, e),
        }
    }

    /// Re-check the persisted session and refresh the cached identity.
    pub async fn get_current_identity(&self) -> CoreResult<Option<Identity>> {
        let previous = self.begin();
        match self.provider.restore_session().await {
            Ok(identity) => {
                self.state.send_replace(AuthSnapshot::resolved(identity.clone()));
                Ok(identity)
            }
            Err(e) => self.restore(previous, e),
        }
    }

    pub async fn update_identity(&self, changes: UpdateIdentity) -> CoreResult<Identity> {
        let previous = self.begin();
        let Some(current) = previous.identity.clone() else {
            return self.restore(previous, CoreError::no_identity());
        };
        match self.provider.update(&current, changes).await {
            Ok(identity) => {
                self.settle(Some(identity.clone()), AuthEventKind::UserUpdated);
                Ok(identity)
            }
            Err(e) => self.restore(previous, e),
        }
    }

    /// Start a password reset. Does not change the cached state.
    pub async fn request_password_reset(&self, email: &str) -> CoreResult<()> {
        self.provider.request_password_reset(email).await
    }

    /// Finish a password reset. The caller stays in whatever state it was in.
    pub async fn complete_password_reset(&self, token: &str, new_password: &str) -> CoreResult<()> {
        let previous = self.begin();
        match self.provider.complete_password_reset(token, new_password).await {
            Ok(()) => {
                self.state.send_replace(previous.clone());
                self.events
                    .publish(AuthEvent::new(AuthEventKind::PasswordRecovery, previous.identity));
                Ok(())
            }
            Err(e) => self.restore(previous, e),
        }
    }

    /// Cached identity without touching storage.
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Watch every state change, including `Loading` transitions.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Subscribe to settled auth events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Scope handed to remote stores.
    pub fn scope(&self) -> IdentityScope {
        IdentityScope::new(self.state.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::kv::{keys, KeyValueStore, MemoryKv};
    use crate::local::LOCAL_IDENTITY_ID;
    use local::LocalIdentityProvider;

    fn service(kv: Arc<dyn KeyValueStore>) -> AuthService {
        AuthService::new(
            Arc::new(LocalIdentityProvider::new(kv)),
            Arc::new(EventBus::default()),
        )
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert_matches!(normalize_email("no-at-sign"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_email("@example.com"), Err(CoreError::Validation(_)));
        assert_matches!(normalize_email("a@b@c"), Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn starts_unknown_then_resolves_anonymous() {
        let auth = service(Arc::new(MemoryKv::new()));
        assert_eq!(auth.snapshot().status, AuthStatus::Unknown);
        assert!(auth.is_loading());

        let mut events = auth.subscribe();
        assert!(auth.initialize().await.is_none());
        assert_eq!(auth.snapshot().status, AuthStatus::Anonymous);

        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::InitialSession);
        assert!(event.identity.is_none());
    }

    #[tokio::test]
    async fn local_sign_in_reuses_single_identity() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let auth = service(kv.clone());
        auth.initialize().await;

        let first = auth
            .sign_up("Ana@Example.com", "pw", IdentityProfile::default())
            .await
            .unwrap();
        assert_eq!(first.id, LOCAL_IDENTITY_ID);
        assert_eq!(first.email, "ana@example.com");
        assert!(auth.is_authenticated());

        auth.sign_out().await.unwrap();
        assert!(!auth.is_authenticated());
        assert!(auth.current_identity().is_none());

        let second = auth.sign_in("someone@else.com", "wrong").await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn session_survives_restart() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let identity = {
            let auth = service(kv.clone());
            auth.initialize().await;
            auth.sign_in("ana@example.com", "pw").await.unwrap()
        };

        let restarted = service(kv.clone());
        assert_eq!(restarted.initialize().await, Some(identity));
        assert!(restarted.is_authenticated());

        restarted.sign_out().await.unwrap();
        assert_eq!(kv.get_item(keys::SESSION).await.unwrap(), None);
        assert!(service(kv).initialize().await.is_none());
    }

    #[tokio::test]
    async fn events_follow_transitions() {
        let auth = service(Arc::new(MemoryKv::new()));
        let mut events = auth.subscribe();
        auth.initialize().await;
        auth.sign_in("ana@example.com", "pw").await.unwrap();
        auth.update_identity(UpdateIdentity {
            full_name: Some("Ana Lima".into()),
            ..Default::default()
        })
        .await
        .unwrap();
        auth.sign_out().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                AuthEventKind::InitialSession,
                AuthEventKind::SignedIn,
                AuthEventKind::UserUpdated,
                AuthEventKind::SignedOut,
            ]
        );
    }

    #[tokio::test]
    async fn failed_update_restores_previous_state() {
        let auth = service(Arc::new(MemoryKv::new()));
        auth.initialize().await;
        let before = auth.snapshot();

        assert_matches!(
            auth.update_identity(UpdateIdentity::default()).await,
            Err(CoreError::Unauthenticated(_))
        );
        assert_eq!(auth.snapshot(), before);
    }

    #[tokio::test]
    async fn invalid_email_update_keeps_identity() {
        let auth = service(Arc::new(MemoryKv::new()));
        auth.initialize().await;
        let identity = auth.sign_in("ana@example.com", "pw").await.unwrap();

        assert_matches!(
            auth.update_identity(UpdateIdentity {
                email: Some("broken".into()),
                ..Default::default()
            })
            .await,
            Err(CoreError::Validation(_))
        );
        assert_eq!(auth.current_identity(), Some(identity));
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn scope_follows_sign_in_and_out() {
        let auth = service(Arc::new(MemoryKv::new()));
        let scope = auth.scope();
        auth.initialize().await;
        assert!(scope.user_id().is_err());

        auth.sign_in("ana@example.com", "pw").await.unwrap();
        assert_eq!(scope.user_id().unwrap(), LOCAL_IDENTITY_ID);

        auth.sign_out().await.unwrap();
        assert!(scope.user_id().is_err());
    }

    #[tokio::test]
    async fn watch_sees_loading_transition() {
        let auth = service(Arc::new(MemoryKv::new()));
        auth.initialize().await;
        let mut rx = auth.watch();
        rx.borrow_and_update();

        auth.sign_in("ana@example.com", "pw").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, AuthStatus::Authenticated);
    }
}
