//! History replay
//!
//! Replays the committed mutation log of a single key into point-in-time
//! snapshots for audit display. The order is whatever the substrate returns,
//! never re-sorted, which is also what lets the repository's delete guard
//! trust the first entry.

use attest_core::{Error, Record, RecordSchema, Result};
use attest_ledger::TransactionContext;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

/// One committed write of a key: the record as of that transaction, or a
/// tombstone.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    /// The record at that point in history; `None` for a tombstone.
    pub record: Option<Record>,
    /// Transaction that committed the write.
    #[serde(rename = "txId")]
    pub tx_id: String,
    /// Commit timestamp, RFC 3339.
    pub timestamp: String,
    /// True when the write was a delete.
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
}

/// Replays mutation history for audit display.
pub struct HistoryReader;

impl HistoryReader {
    /// All committed mutations of `id`, in the substrate's native order.
    pub fn history<C: TransactionContext>(
        ctx: &mut C,
        schema: &RecordSchema,
        id: &str,
    ) -> Result<Vec<HistorySnapshot>> {
        let modifications = ctx.history_for_key(id)?;
        let mut snapshots = Vec::with_capacity(modifications.len());
        for modification in modifications {
            let record = match &modification.value {
                Some(bytes) => Some(schema.decode(bytes)?),
                None => None,
            };
            let timestamp = modification
                .timestamp
                .format(&Rfc3339)
                .map_err(|err| Error::Serialization(err.to_string()))?;
            snapshots.push(HistorySnapshot {
                record,
                tx_id: modification.tx_id,
                timestamp,
                is_delete: modification.is_delete,
            });
        }
        Ok(snapshots)
    }
}
