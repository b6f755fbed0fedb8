//! Incremental cursor tracking
//!
//! A `CursorTracker` decorates a stream with a watermark over the fixed
//! `timestamp` field. The value moves one way: unset → seeded from host
//! state or the configured start date → max of observed record values.

use crate::state::StreamState;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::warn;

/// The watermark field name
pub const CURSOR_FIELD: &str = "timestamp";

/// Query parameter carrying the time filter
const START_TIME_PARAM: &str = "startTime";

/// Tracks the maximum observed watermark for one stream instance
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    value: Option<Value>,
}

impl CursorTracker {
    /// Create a tracker, seeded from the configured start date if present
    pub fn new(start_date: Option<&str>) -> Self {
        Self {
            value: start_date.map(|s| Value::String(s.to_string())),
        }
    }

    /// Current watermark value
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Adopt the host-persisted state, overriding the start-date seed
    pub fn set_state(&mut self, state: &StreamState) {
        if let Some(timestamp) = &state.timestamp {
            self.value = Some(timestamp.clone());
        }
    }

    /// Export state in the host-persisted shape
    pub fn state(&self) -> StreamState {
        StreamState {
            timestamp: self.value.clone(),
        }
    }

    /// Time-filter query parameters for the next request
    ///
    /// Taken from the current watermark (host state or start date); absent
    /// when neither is set. Page-token parameters merge on top of these.
    pub fn request_params(&self) -> Vec<(String, String)> {
        match self.value.as_ref().and_then(param_string) {
            Some(value) => vec![(START_TIME_PARAM.to_string(), value)],
            None => Vec::new(),
        }
    }

    /// Advance the watermark from an observed record
    ///
    /// The cursor only ever moves forward: `max(current, record value)` under
    /// the value's native ordering. A record without the field, or with a
    /// value that cannot be compared to the current cursor, leaves the cursor
    /// unchanged; the record itself is still emitted by the caller.
    pub fn observe(&mut self, record: &Value) {
        let observed = match record.get(CURSOR_FIELD) {
            Some(value) if !value.is_null() => value,
            _ => {
                warn!("record has no '{CURSOR_FIELD}' field; cursor not advanced");
                return;
            }
        };

        match &self.value {
            None => self.value = Some(observed.clone()),
            Some(current) => match cursor_cmp(observed, current) {
                Some(Ordering::Greater) => self.value = Some(observed.clone()),
                Some(_) => {}
                None => {
                    warn!(
                        "record '{CURSOR_FIELD}' value {observed} is not comparable \
                         with current cursor {current}; cursor not advanced"
                    );
                }
            },
        }
    }
}

/// Value-wise comparison over the watermark's native ordering
///
/// Strings compare lexicographically (ISO 8601 timestamps sort correctly),
/// numbers numerically. Mixed or non-scalar types are incomparable.
fn cursor_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                Some(a.cmp(&b))
            } else {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
        }
        _ => None,
    }
}

/// Render a watermark value as a query parameter
fn param_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
