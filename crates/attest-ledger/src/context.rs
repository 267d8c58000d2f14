//! Transaction-context trait and the value types crossing it
//!
//! One value of [`TransactionContext`] is handed to the contract layer per
//! invocation. Every read, write, query, and event emission the contract
//! performs goes through it, and the substrate commits or discards the whole
//! invocation atomically after the contract returns.

use crate::query::{Selector, SortSpec};
use attest_core::{OrgLabel, Result};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Caller-supplied out-of-band fields for the current invocation.
///
/// Used to pass sensitive values that must never appear in the public
/// transaction arguments; the contract routes them into a private collection.
pub type TransientMap = BTreeMap<String, String>;

/// One key with its stored payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Storage key.
    pub key: String,
    /// Stored payload bytes.
    pub value: Vec<u8>,
}

/// One committed mutation of a key, as replayed by the history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction that committed the mutation.
    pub tx_id: String,
    /// Commit timestamp.
    pub timestamp: OffsetDateTime,
    /// Payload written, or `None` for a tombstone.
    pub value: Option<Vec<u8>>,
    /// True when the mutation was a delete.
    pub is_delete: bool,
}

/// One window of a paginated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// Entries in this window.
    pub entries: Vec<KeyValue>,
    /// Number of entries fetched.
    pub fetched_count: u32,
    /// Opaque continuation token; empty when the result set is exhausted.
    pub bookmark: String,
}

/// Per-invocation handle onto the ledger substrate.
///
/// Mirrors the substrate's native stub: world-state key-value access with
/// range/structural/history queries, named private collections with a
/// content-hash probe, the transient map, an event sink, and the caller's
/// organization label. Reads observe writes made earlier in the same
/// invocation; nothing is visible outside it until commit.
///
/// Methods take `&mut self` because implementations track the read and write
/// sets that back the substrate's commit-time conflict detection.
pub trait TransactionContext {
    /// The current transaction id.
    fn tx_id(&self) -> &str;

    /// The organization identity the invocation executes under. Trusted;
    /// issued by the substrate's membership layer.
    fn client_org(&self) -> &OrgLabel;

    /// Caller-supplied out-of-band fields.
    fn transient(&self) -> &TransientMap;

    /// Read a world-state key.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a world-state key.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a world-state key.
    fn delete_state(&mut self, key: &str) -> Result<()>;

    /// Lexicographic world-state scan, `end` exclusive; an empty bound means
    /// open-ended. Ascending key order.
    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<Vec<KeyValue>>;

    /// Structural query over world state with an optional one-field sort.
    fn query_state(&mut self, selector: &Selector, sort: Option<&SortSpec>)
        -> Result<Vec<KeyValue>>;

    /// Structural query over world state bounded to `page_size` entries per
    /// window. An empty `bookmark` requests the first window; passing the
    /// returned bookmark back verbatim fetches the next one. A `page_size`
    /// of zero is rejected with a validation error, since a window that can
    /// never advance would return an empty bookmark and falsely signal
    /// exhaustion.
    fn query_state_with_pagination(
        &mut self,
        selector: &Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RawPage>;

    /// Replay the committed mutation history of a world-state key, in the
    /// ledger's native order. Callers must treat the order as received.
    fn history_for_key(&mut self, key: &str) -> Result<Vec<KeyModification>>;

    /// Read a key from a private collection.
    fn get_private_data(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Content-hash existence probe on a private collection. Available to
    /// organizations that cannot read the plaintext.
    fn get_private_data_hash(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a key into a private collection.
    fn put_private_data(&mut self, collection: &str, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a key from a private collection.
    fn delete_private_data(&mut self, collection: &str, key: &str) -> Result<()>;

    /// Lexicographic range scan over a private collection.
    fn get_private_data_by_range(
        &mut self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>>;

    /// Structural query over a private collection.
    fn query_private_data(
        &mut self,
        collection: &str,
        selector: &Selector,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<KeyValue>>;

    /// Structural query over a private collection bounded to `page_size`
    /// entries per window, with the same bookmark contract as
    /// [`TransactionContext::query_state_with_pagination`].
    fn query_private_data_with_pagination(
        &mut self,
        collection: &str,
        selector: &Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RawPage>;

    /// Register an event to be delivered to out-of-process listeners after the
    /// invocation commits. Never delivered when the invocation aborts.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()>;
}
