//! Identity-change notifications.
//!
//! - [`bus`] -- broadcast channel carrying [`bus::AuthEvent`]s from the auth
//!   service to any number of subscribers.
//! - [`audit`] -- background task that logs every event.

pub mod audit;
pub mod bus;

pub use audit::AuthAuditLog;
pub use bus::{AuthEvent, AuthEventKind, EventBus};
