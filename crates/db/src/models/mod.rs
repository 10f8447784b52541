//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` + `Deserialize` record struct. The same shape
//!   is stored as a table row remotely and as a JSON array element locally.
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod day_plan;
pub mod identity;
pub mod password_reset;
pub mod status;
pub mod story;
pub mod trip;
