//! Transactions stream
//!
//! Incremental on the `timestamp` watermark, primary key `txid`. The only
//! shaping is over the two commit-volume maps: each `address → currency →
//! {input, output, balance}` mapping becomes an ordered sequence of
//! address-grouped entries so downstream schemas stay flat. All other fields
//! pass through unchanged.

use super::{CursorTracker, LedgerStream, RecordShaper};
use crate::error::{Error, Result};
use crate::types::SyncMode;
use serde_json::{json, Value};

/// The two volume maps attached to a transaction (before/after it applied)
const VOLUME_FIELDS: [&str; 2] = ["preCommitVolumes", "postCommitVolumes"];

/// Build the transactions stream for a ledger
pub fn stream(ledger: &str, start_date: Option<&str>) -> LedgerStream {
    LedgerStream {
        name: "transactions",
        path: format!("/api/ledger/{ledger}/transactions"),
        primary_key: Some("txid"),
        sync_mode: SyncMode::Incremental,
        shaper: RecordShaper::CommitVolumes,
        cursor: Some(CursorTracker::new(start_date)),
    }
}

/// Rewrite a transaction's commit-volume maps in place
///
/// A volume field that is absent stays absent; a present field is replaced
/// with `[{address, currencies: [{currency, input, output, balance}]}]` in
/// input key order. Missing sub-fields become null, not zero.
pub fn transform(mut record: Value) -> Result<Value> {
    let element = record
        .as_object_mut()
        .ok_or_else(|| Error::malformed("transaction element is not an object"))?;

    for field in VOLUME_FIELDS {
        if let Some(volumes) = element.get(field) {
            let transformed = transform_volumes(field, volumes)?;
            element.insert(field.to_string(), Value::Array(transformed));
        }
    }

    Ok(record)
}

/// Flatten one volume map into address-grouped entries
fn transform_volumes(field: &str, volumes: &Value) -> Result<Vec<Value>> {
    let addresses = volumes
        .as_object()
        .ok_or_else(|| Error::malformed(format!("'{field}' is not an object")))?;

    let mut entries = Vec::with_capacity(addresses.len());
    for (address, currencies) in addresses {
        let currencies = currencies.as_object().ok_or_else(|| {
            Error::malformed(format!("'{field}' entry for '{address}' is not an object"))
        })?;

        let currency_entries: Vec<Value> = currencies
            .iter()
            .map(|(currency, volume)| {
                json!({
                    "currency": currency,
                    "input": volume.get("input").cloned().unwrap_or(Value::Null),
                    "output": volume.get("output").cloned().unwrap_or(Value::Null),
                    "balance": volume.get("balance").cloned().unwrap_or(Value::Null),
                })
            })
            .collect();

        entries.push(json!({
            "address": address,
            "currencies": currency_entries,
        }));
    }

    Ok(entries)
}
