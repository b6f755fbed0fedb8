//! Balances stream
//!
//! The API returns balances as a nested mapping `address → asset → amount`;
//! each (address, asset) pair becomes one flat output record.

use super::{LedgerStream, RecordShaper};
use crate::error::{Error, Result};
use crate::types::SyncMode;
use serde_json::{json, Value};

/// Build the balances stream for a ledger
pub fn stream(ledger: &str) -> LedgerStream {
    LedgerStream {
        name: "balances",
        path: format!("/api/ledger/{ledger}/balances"),
        primary_key: None,
        sync_mode: SyncMode::FullRefresh,
        shaper: RecordShaper::BalanceFlatten,
        cursor: None,
    }
}

/// Flatten one raw balances element into `{address, asset, balance}` records
///
/// Output order follows the input key order. An element with no nested keys
/// contributes zero records; an element that is not a nested mapping is a
/// malformed response.
pub fn flatten(element: &Value) -> Result<Vec<Value>> {
    let addresses = element
        .as_object()
        .ok_or_else(|| Error::malformed("balances element is not an object"))?;

    let mut records = Vec::new();
    for (address, assets) in addresses {
        let assets = assets.as_object().ok_or_else(|| {
            Error::malformed(format!("balances for '{address}' is not an object"))
        })?;
        for (asset, balance) in assets {
            records.push(json!({
                "address": address,
                "asset": asset,
                "balance": balance,
            }));
        }
    }

    Ok(records)
}
