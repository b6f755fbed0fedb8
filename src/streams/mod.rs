//! Stream definitions
//!
//! Each stream is a plain descriptor value: a name, an endpoint path scoped
//! to the configured ledger, an optional primary key, a record shaper, and
//! (for incremental streams) a cursor tracker. Pagination and transport are
//! composed around the descriptor by the engine rather than inherited from a
//! base stream.

mod accounts;
mod balances;
mod incremental;
mod transactions;

pub use incremental::{CursorTracker, CURSOR_FIELD};

use crate::config::SourceConfig;
use crate::error::Result;
use crate::types::SyncMode;
use serde_json::Value;


// ============================================================================
// Record Shaper
// ============================================================================

/// Per-stream record shaping
///
/// Applied to each raw element of a page before emission. A shaper may fan a
/// single raw element out into several records (Balances) or rewrite fields
/// in place (Transactions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShaper {
    /// Pass the raw element through untouched
    Identity,
    /// Flatten the address→asset→amount mapping into (address, asset) records
    BalanceFlatten,
    /// Rewrite commit-volume maps into ordered address-grouped sequences
    CommitVolumes,
}

impl RecordShaper {
    /// Shape one raw element into zero or more output records
    pub fn shape(&self, record: Value) -> Result<Vec<Value>> {
        match self {
            Self::Identity => Ok(vec![record]),
            Self::BalanceFlatten => balances::flatten(&record),
            Self::CommitVolumes => transactions::transform(record).map(|r| vec![r]),
        }
    }
}

// ============================================================================
// Stream Descriptor
// ============================================================================

/// A single extractable stream of the ledger API
#[derive(Debug)]
pub struct LedgerStream {
    /// Stream name as exposed to the host
    pub name: &'static str,
    /// Endpoint path, already scoped to the configured ledger
    pub path: String,
    /// Source-defined primary key, if the stream has one
    pub primary_key: Option<&'static str>,
    /// Supported sync mode
    pub sync_mode: SyncMode,
    /// Record shaping applied to each raw element
    pub shaper: RecordShaper,
    /// Watermark tracking for incremental streams
    pub cursor: Option<CursorTracker>,
}

impl LedgerStream {
    /// Shape one raw element, observing the cursor for each output record
    pub fn shape_record(&mut self, raw: Value) -> Result<Vec<Value>> {
        let records = self.shaper.shape(raw)?;
        if let Some(tracker) = self.cursor.as_mut() {
            for record in &records {
                tracker.observe(record);
            }
        }
        Ok(records)
    }

    /// Whether this stream syncs incrementally
    pub fn is_incremental(&self) -> bool {
        self.sync_mode == SyncMode::Incremental
    }
}

/// Build the streams for a configured ledger
pub fn ledger_streams(config: &SourceConfig) -> Vec<LedgerStream> {
    vec![
        accounts::stream(&config.ledger),
        balances::stream(&config.ledger),
        transactions::stream(&config.ledger, config.start_date.as_deref()),
    ]
}
