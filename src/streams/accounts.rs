//! Accounts stream
//!
//! Full-refresh passthrough of the ledger's account objects. The API does
//! not define a usable primary key, so the host must treat records as
//! non-deduplicable.

use super::{LedgerStream, RecordShaper};
use crate::types::SyncMode;

/// Build the accounts stream for a ledger
pub fn stream(ledger: &str) -> LedgerStream {
    LedgerStream {
        name: "accounts",
        path: format!("/api/ledger/{ledger}/accounts"),
        primary_key: None,
        sync_mode: SyncMode::FullRefresh,
        shaper: RecordShaper::Identity,
        cursor: None,
    }
}
