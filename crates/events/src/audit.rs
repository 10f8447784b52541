//! Structured audit log of identity changes.
//!
//! [`AuthAuditLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes one `tracing` record per [`AuthEvent`]. It runs as a background
//! task and stops when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::AuthEvent;

/// Background listener that logs every auth event.
pub struct AuthAuditLog;

impl AuthAuditLog {
    /// Run the logging loop until the channel closes. Returns how many
    /// events were logged.
    pub async fn run(mut receiver: broadcast::Receiver<AuthEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        kind = ?event.kind,
                        identity_id = event.identity.as_ref().map(|i| i.id.as_str()),
                        at = %event.timestamp,
                        "Auth state changed"
                    );
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Auth audit log lagged, some events were skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, auth audit log shutting down");
                    break;
                }
            }
        }
        logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{AuthEventKind, EventBus};

    #[tokio::test]
    async fn stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(AuthAuditLog::run(bus.subscribe()));

        bus.publish(AuthEvent::new(AuthEventKind::InitialSession, None));
        bus.publish(AuthEvent::new(AuthEventKind::SignedOut, None));
        drop(bus);

        let logged = handle.await.expect("audit task should not panic");
        assert_eq!(logged, 2);
    }
}
