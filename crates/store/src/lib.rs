//! Dual-backend persistence for trips, day plans, stories, and identities.
//!
//! The process resolves its [`mode::ModeResolver`] once at start-up and
//! [`services::Services::build`] wires every entity service to the store
//! implementation for that mode:
//!
//! - [`local`] -- JSON collections in a flat [`kv::KeyValueStore`].
//! - [`remote`] -- owner-scoped PostgreSQL repositories from `wayfarer_db`.
//!
//! Callers only ever see the service methods and [`wayfarer_core::error::CoreError`].

pub mod auth;
pub mod blob;
pub mod config;
pub mod kv;
pub mod local;
pub mod mode;
pub mod remote;
pub mod services;
pub mod store;

pub use services::Services;
