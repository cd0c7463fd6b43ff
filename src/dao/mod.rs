//! Data access layer: persisted record types and the store abstraction.

pub mod models;
pub mod store;
