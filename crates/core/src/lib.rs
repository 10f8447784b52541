//! Domain primitives shared by every Wayfarer crate.
//!
//! Nothing in here performs I/O: ids, the service clock, the error
//! taxonomy, the typed itinerary payload, and storage-mode validation.

pub mod clock;
pub mod error;
pub mod ids;
pub mod itinerary;
pub mod mode;
pub mod types;
pub mod validation;
