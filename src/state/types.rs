//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Complete state for the connector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the watermark for a stream
    pub fn get_timestamp(&self, stream: &str) -> Option<&Value> {
        self.streams.get(stream)?.timestamp.as_ref()
    }

    /// Set the watermark for a stream
    pub fn set_timestamp(&mut self, stream: &str, timestamp: Value) {
        self.get_stream_mut(stream).timestamp = Some(timestamp);
    }
}

/// State for a single stream
///
/// The watermark field name is fixed to `timestamp`; the value is whatever
/// the API returned for that field, compared value-wise when advancing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamState {
    /// Current watermark value (for incremental sync)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }
}
