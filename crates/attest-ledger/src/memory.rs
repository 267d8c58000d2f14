//! In-memory ledger with atomic commit and optimistic concurrency
//!
//! [`MemoryLedger`] models the guarantees the real substrate provides to a
//! single invocation: reads observe earlier writes of the same transaction,
//! nothing leaks before commit, and commit applies every buffered write or
//! none of them. Cross-transaction interference is handled the way the real
//! ledger handles it: optimistically. Each transaction records the version of
//! every key it read; commit validates that read set against the current
//! committed versions and rejects the whole transaction with `CommitConflict`
//! when any key has moved.
//!
//! Range scans and structural queries record the versions of the keys they
//! return but do not detect phantoms, matching the substrate's behavior.

use crate::context::{KeyModification, KeyValue, RawPage, TransactionContext, TransientMap};
use crate::query::{Selector, SortOrder, SortSpec};
use attest_core::{Error, OrgLabel, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

/// `None` addresses world state; `Some(name)` a private collection.
type CollectionRef = Option<String>;

#[derive(Debug, Clone)]
struct HistoryEntry {
    tx_id: String,
    timestamp: OffsetDateTime,
    value: Option<Vec<u8>>,
    seq: u64,
}

#[derive(Debug, Default)]
struct CollectionState {
    live: BTreeMap<String, Vec<u8>>,
    versions: BTreeMap<String, u64>,
    history: BTreeMap<String, Vec<HistoryEntry>>,
}

impl CollectionState {
    fn version_of(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    sequence: u64,
    world: CollectionState,
    private: BTreeMap<String, CollectionState>,
    events: Vec<EmittedEvent>,
}

impl LedgerInner {
    fn collection(&self, collection: &CollectionRef) -> Option<&CollectionState> {
        match collection {
            None => Some(&self.world),
            Some(name) => self.private.get(name),
        }
    }

    fn collection_mut(&mut self, collection: &CollectionRef) -> &mut CollectionState {
        match collection {
            None => &mut self.world,
            Some(name) => self.private.entry(name.clone()).or_default(),
        }
    }

    fn version_of(&self, collection: &CollectionRef, key: &str) -> u64 {
        self.collection(collection)
            .map(|state| state.version_of(key))
            .unwrap_or(0)
    }
}

/// An event delivered to out-of-process listeners after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    /// Transaction that emitted the event.
    pub tx_id: String,
    /// Event name.
    pub name: String,
    /// Event payload bytes.
    pub payload: Vec<u8>,
}

/// Shared in-memory ledger. Cheap to clone; clones address the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<LedgerInner>>,
}

impl MemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction for the given organization.
    pub fn begin(&self, org: impl Into<OrgLabel>, transient: TransientMap) -> MemoryTransaction {
        MemoryTransaction {
            inner: Arc::clone(&self.inner),
            tx_id: Uuid::new_v4().to_string(),
            org: org.into(),
            transient,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Run `f` inside a fresh transaction and commit atomically on success.
    ///
    /// When `f` fails, the transaction is discarded and no buffered write or
    /// event becomes observable. When `f` succeeds but a concurrently
    /// committed transaction invalidated the read set, the whole invocation
    /// fails with `CommitConflict` and the caller retries from scratch.
    pub fn execute<T>(
        &self,
        org: impl Into<OrgLabel>,
        transient: TransientMap,
        f: impl FnOnce(&mut MemoryTransaction) -> Result<T>,
    ) -> Result<T> {
        let mut tx = self.begin(org, transient);
        let value = f(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Events committed so far, in delivery order.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.inner.read().events.clone()
    }
}

/// One open transaction against a [`MemoryLedger`].
pub struct MemoryTransaction {
    inner: Arc<RwLock<LedgerInner>>,
    tx_id: String,
    org: OrgLabel,
    transient: TransientMap,
    reads: BTreeMap<(CollectionRef, String), u64>,
    writes: BTreeMap<(CollectionRef, String), Option<Vec<u8>>>,
    events: Vec<(String, Vec<u8>)>,
}

impl MemoryTransaction {
    /// Validate the read set and apply every buffered write as one unit.
    pub fn commit(self) -> Result<()> {
        let mut inner = self.inner.write();

        for ((collection, key), version) in &self.reads {
            let current = inner.version_of(collection, key);
            if current != *version {
                debug!(
                    tx_id = %self.tx_id,
                    key = %key,
                    "commit rejected: read version {version} superseded by {current}"
                );
                return Err(Error::commit_conflict(format!(
                    "key {key} was modified by a concurrent transaction"
                )));
            }
        }

        inner.sequence += 1;
        let seq = inner.sequence;
        let timestamp = OffsetDateTime::now_utc();

        for ((collection, key), write) in self.writes {
            let state = inner.collection_mut(&collection);
            match &write {
                Some(value) => {
                    state.live.insert(key.clone(), value.clone());
                }
                None => {
                    state.live.remove(&key);
                }
            }
            state.versions.insert(key.clone(), seq);
            state.history.entry(key).or_default().push(HistoryEntry {
                tx_id: self.tx_id.clone(),
                timestamp,
                value: write.clone(),
                seq,
            });
        }

        for (name, payload) in self.events {
            inner.events.push(EmittedEvent {
                tx_id: self.tx_id.clone(),
                name,
                payload,
            });
        }

        debug!(tx_id = %self.tx_id, seq, "transaction committed");
        Ok(())
    }

    fn read(&mut self, collection: CollectionRef, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(buffered) = self.writes.get(&(collection.clone(), key.to_string())) {
            return Ok(buffered.clone());
        }

        let inner = self.inner.read();
        let version = inner.version_of(&collection, key);
        let value = inner
            .collection(&collection)
            .and_then(|state| state.live.get(key).cloned());
        drop(inner);

        self.reads.insert((collection, key.to_string()), version);
        Ok(value)
    }

    fn write(&mut self, collection: CollectionRef, key: &str, value: Option<Vec<u8>>) {
        self.writes.insert((collection, key.to_string()), value);
    }

    /// Committed entries merged with this transaction's buffered writes, in
    /// ascending key order, each carrying the version a read of it validates
    /// against. Does not touch the read set; callers record reads for the
    /// keys they actually return.
    fn merged_entries(&self, collection: &CollectionRef) -> Vec<(String, Vec<u8>, u64)> {
        let inner = self.inner.read();
        let mut merged: BTreeMap<String, (Option<Vec<u8>>, u64)> = BTreeMap::new();

        if let Some(state) = inner.collection(collection) {
            for (key, value) in &state.live {
                merged.insert(key.clone(), (Some(value.clone()), state.version_of(key)));
            }
        }
        drop(inner);

        for ((coll, key), write) in &self.writes {
            if coll == collection {
                let version = merged.get(key).map(|(_, v)| *v).unwrap_or(0);
                merged.insert(key.clone(), (write.clone(), version));
            }
        }

        merged
            .into_iter()
            .filter_map(|(key, (value, version))| value.map(|value| (key, value, version)))
            .collect()
    }

    fn record_read(&mut self, collection: &CollectionRef, key: &str, version: u64) {
        self.reads
            .entry((collection.clone(), key.to_string()))
            .or_insert(version);
    }

    fn scan_range(
        &mut self,
        collection: CollectionRef,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>> {
        let mut entries = Vec::new();
        for (key, value, version) in self.merged_entries(&collection) {
            if (start.is_empty() || key.as_str() >= start)
                && (end.is_empty() || key.as_str() < end)
            {
                self.record_read(&collection, &key, version);
                entries.push(KeyValue { key, value });
            }
        }
        Ok(entries)
    }

    fn run_query(
        &mut self,
        collection: CollectionRef,
        selector: &Selector,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<KeyValue>> {
        let mut matched = Vec::new();
        for (key, value, version) in self.merged_entries(&collection) {
            let decoded: serde_json::Value = serde_json::from_slice(&value)
                .map_err(|err| Error::Serialization(format!("key {key}: {err}")))?;
            if selector.matches(&decoded) {
                self.record_read(&collection, &key, version);
                matched.push((KeyValue { key, value }, decoded));
            }
        }

        if let Some(sort) = sort {
            matched.sort_by(|(a, va), (b, vb)| {
                let field_a = va.get(&sort.field).and_then(|v| v.as_str()).unwrap_or("");
                let field_b = vb.get(&sort.field).and_then(|v| v.as_str()).unwrap_or("");
                let ordering = field_a.cmp(field_b).then_with(|| a.key.cmp(&b.key));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        Ok(matched.into_iter().map(|(entry, _)| entry).collect())
    }

    fn run_paginated_query(
        &mut self,
        collection: CollectionRef,
        selector: &Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RawPage> {
        // A zero-sized window could never advance, so the empty bookmark it
        // returned would falsely signal exhaustion.
        if page_size == 0 {
            return Err(Error::validation("pageSize", "must be at least 1"));
        }
        let resume_after = decode_bookmark(bookmark)?;
        let matched = self.run_query(collection, selector, None)?;

        let mut window = Vec::new();
        let mut more = false;
        for entry in matched {
            if let Some(resume_after) = &resume_after {
                if entry.key.as_str() <= resume_after.as_str() {
                    continue;
                }
            }
            if window.len() as u32 >= page_size {
                more = true;
                break;
            }
            window.push(entry);
        }

        let bookmark = if more {
            window
                .last()
                .map(|entry| encode_bookmark(&entry.key))
                .unwrap_or_default()
        } else {
            String::new()
        };

        Ok(RawPage {
            fetched_count: window.len() as u32,
            entries: window,
            bookmark,
        })
    }
}

fn decode_bookmark(bookmark: &str) -> Result<Option<String>> {
    if bookmark.is_empty() {
        return Ok(None);
    }
    let bytes = BASE64
        .decode(bookmark)
        .map_err(|_| Error::validation("bookmark", "not a continuation token"))?;
    let key = String::from_utf8(bytes)
        .map_err(|_| Error::validation("bookmark", "not a continuation token"))?;
    Ok(Some(key))
}

fn encode_bookmark(key: &str) -> String {
    BASE64.encode(key.as_bytes())
}

impl TransactionContext for MemoryTransaction {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn client_org(&self) -> &OrgLabel {
        &self.org
    }

    fn transient(&self) -> &TransientMap {
        &self.transient
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read(None, key)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.write(None, key, Some(value));
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> Result<()> {
        self.write(None, key, None);
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<Vec<KeyValue>> {
        self.scan_range(None, start, end)
    }

    fn query_state(
        &mut self,
        selector: &Selector,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<KeyValue>> {
        self.run_query(None, selector, sort)
    }

    fn query_state_with_pagination(
        &mut self,
        selector: &Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RawPage> {
        self.run_paginated_query(None, selector, page_size, bookmark)
    }

    fn history_for_key(&mut self, key: &str) -> Result<Vec<KeyModification>> {
        let inner = self.inner.read();
        let mut committed: Vec<HistoryEntry> = inner
            .world
            .history
            .get(key)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let version = inner.world.version_of(key);
        drop(inner);

        // Native order of the backing ledger: newest first, keyed by the
        // commit sequence.
        committed.sort_by(|a, b| b.seq.cmp(&a.seq));
        self.record_read(&None, key, version);
        Ok(committed
            .into_iter()
            .map(|entry| KeyModification {
                tx_id: entry.tx_id,
                timestamp: entry.timestamp,
                is_delete: entry.value.is_none(),
                value: entry.value,
            })
            .collect())
    }

    fn get_private_data(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.read(Some(collection.to_string()), key)
    }

    fn get_private_data_hash(&mut self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.read(Some(collection.to_string()), key)?;
        Ok(value.map(|value| {
            let digest = Sha256::digest(&value);
            debug!(collection, key, hash = %hex::encode(digest), "private data hash probe");
            digest.to_vec()
        }))
    }

    fn put_private_data(&mut self, collection: &str, key: &str, value: Vec<u8>) -> Result<()> {
        self.write(Some(collection.to_string()), key, Some(value));
        Ok(())
    }

    fn delete_private_data(&mut self, collection: &str, key: &str) -> Result<()> {
        self.write(Some(collection.to_string()), key, None);
        Ok(())
    }

    fn get_private_data_by_range(
        &mut self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>> {
        self.scan_range(Some(collection.to_string()), start, end)
    }

    fn query_private_data(
        &mut self,
        collection: &str,
        selector: &Selector,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<KeyValue>> {
        self.run_query(Some(collection.to_string()), selector, sort)
    }

    fn query_private_data_with_pagination(
        &mut self,
        collection: &str,
        selector: &Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<RawPage> {
        self.run_paginated_query(Some(collection.to_string()), selector, page_size, bookmark)
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()> {
        self.events.push((name.to_string(), payload));
        Ok(())
    }
}
