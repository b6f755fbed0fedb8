//! State management module
//!
//! Persists the incremental watermark between sync runs. The host (or the
//! CLI standing in for one) round-trips per-stream state of the shape
//! `{"timestamp": <value>}`; the connector only ever moves the value forward.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};

#[cfg(test)]
mod manager_tests;
