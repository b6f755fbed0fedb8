//! Execution engine module
//!
//! The pull-based read loop: one stream at a time, one page per request,
//! records produced in server order. The engine composes the transport, the
//! cursor paginator, the stream's shaper and its optional cursor tracker; it
//! performs no local recovery — every failure bubbles to the caller.

mod types;

pub use types::{LogLevel, Message, SyncConfig, SyncStats};

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{CursorPaginator, PageToken};
use crate::state::StateManager;
use crate::streams::LedgerStream;
use serde_json::Value;
use std::time::Instant;

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP transport (already authenticated)
    client: HttpClient,
    /// State manager
    state: StateManager,
    /// Cursor paginator shared by all streams
    paginator: CursorPaginator,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient, state: StateManager) -> Self {
        Self {
            client,
            state,
            paginator: CursorPaginator::new(),
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync a single stream to completion
    ///
    /// Returns the messages produced: records in server order, optional
    /// per-page state checkpoints, and a final state message for incremental
    /// streams.
    pub async fn sync_stream(&mut self, stream: &mut LedgerStream) -> Result<Vec<Message>> {
        let start = Instant::now();
        let mut messages = Vec::new();

        messages.push(Message::info(format!(
            "Starting sync for stream: {}",
            stream.name
        )));

        // Seed the tracker from host-persisted state, then snapshot the time
        // filter for the whole slice. Page tokens merge on top of it.
        let time_filter: Vec<(String, String)> = match stream.cursor.as_mut() {
            Some(tracker) => {
                if let Some(host_state) = self.state.state().await.get_stream(stream.name) {
                    tracker.set_state(host_state);
                }
                tracker.request_params()
            }
            None => Vec::new(),
        };

        let mut token: Option<PageToken> = None;
        let mut page_count = 0usize;
        let mut stream_records = 0usize;
        let mut capped = false;

        loop {
            let mut request = RequestConfig::new();
            for (key, value) in &time_filter {
                request = request.query(key, value);
            }
            for (key, value) in self.paginator.request_params(token.as_ref()) {
                request = request.query(key, value);
            }

            let response = self.client.get_with_config(&stream.path, request).await?;
            let body: Value = response.json().await.map_err(Error::Http)?;

            page_count += 1;
            self.stats.add_page();

            let raw_records = self.paginator.parse_records(&body)?;
            let mut page_records = 0usize;

            for raw in raw_records {
                let shaped = stream.shape_record(raw)?;
                for record in shaped {
                    messages.push(Message::record(stream.name, record));
                    page_records += 1;
                    stream_records += 1;
                    self.stats.add_records(1);

                    if self.config.max_records > 0 && stream_records >= self.config.max_records {
                        capped = true;
                        break;
                    }
                }
                if capped {
                    break;
                }
            }

            messages.push(Message::debug(format!(
                "Page {page_count}: emitted {page_records} records"
            )));

            if capped {
                break;
            }

            // Token for the next request comes strictly from this response
            token = self.paginator.next_page_token(&body)?;

            if self.config.emit_state_per_page {
                if let Some(state_message) = self.checkpoint(stream).await? {
                    messages.push(state_message);
                }
            }

            if token.is_none() {
                break;
            }
        }

        // Final state for incremental streams
        if let Some(state_message) = self.checkpoint(stream).await? {
            messages.push(state_message);
        }

        self.stats.add_stream();
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        messages.push(Message::info(format!(
            "Completed sync for {}: {stream_records} records in {page_count} pages",
            stream.name
        )));

        Ok(messages)
    }

    /// Persist the stream's watermark and build a state message
    ///
    /// No-op for full-refresh streams or a tracker that never observed a
    /// value.
    async fn checkpoint(&mut self, stream: &LedgerStream) -> Result<Option<Message>> {
        let Some(tracker) = stream.cursor.as_ref() else {
            return Ok(None);
        };

        let stream_state = tracker.state();
        let Some(timestamp) = stream_state.timestamp.clone() else {
            return Ok(None);
        };

        self.state.set_timestamp(stream.name, timestamp).await?;
        let data = serde_json::to_value(&stream_state)?;
        Ok(Some(Message::state(stream.name, data)))
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = SyncStats::default();
    }
}

#[cfg(test)]
mod tests;
