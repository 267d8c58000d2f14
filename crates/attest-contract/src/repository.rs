//! Generic asset repository
//!
//! One implementation of the create/read/delete/scan/query/paginate set,
//! parameterized by a [`RecordSchema`] and a [`Collection`]. Adding a record
//! kind is a schema value, not another copy of this code.
//!
//! The repository owns storage semantics only. Authorization happens before a
//! repository call (see `contract`), and the reconciliation state machine
//! lives in `reconcile`.

use attest_core::{Error, FieldMap, Record, RecordSchema, Result};
use attest_ledger::{KeyValue, Selector, SortSpec, TransactionContext};
use serde::Serialize;
use tracing::debug;

/// Where a repository's records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    /// Publicly readable world state.
    World,
    /// A named restricted collection. Content is only readable by the
    /// organizations enumerated in the collection's deployment; existence is
    /// probed through the content hash.
    Private(String),
}

/// A bounded window of a paginated query, in the shape the gateway returns.
#[derive(Debug, Clone, Serialize)]
pub struct PageWindow {
    /// Records in this window.
    pub records: Vec<Record>,
    /// Number of records fetched.
    #[serde(rename = "fetchedRecordsCount")]
    pub fetched_count: u32,
    /// Opaque continuation token; empty when the result set is exhausted.
    /// Passed back verbatim to fetch the next window.
    pub bookmark: String,
}

/// Key-addressed CRUD plus the three query modes over one logical collection.
pub struct AssetRepository<'a, C: TransactionContext> {
    ctx: &'a mut C,
    schema: &'a RecordSchema,
    collection: Collection,
}

impl<'a, C: TransactionContext> AssetRepository<'a, C> {
    /// Repository over world state.
    pub fn world(ctx: &'a mut C, schema: &'a RecordSchema) -> Self {
        Self {
            ctx,
            schema,
            collection: Collection::World,
        }
    }

    /// Repository over a named restricted collection.
    pub fn private(
        ctx: &'a mut C,
        schema: &'a RecordSchema,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            schema,
            collection: Collection::Private(collection.into()),
        }
    }

    fn private_name(&self) -> Option<String> {
        match &self.collection {
            Collection::World => None,
            Collection::Private(name) => Some(name.clone()),
        }
    }

    fn get_raw(&mut self, id: &str) -> Result<Option<Vec<u8>>> {
        match self.private_name() {
            None => self.ctx.get_state(id),
            Some(name) => self.ctx.get_private_data(&name, id),
        }
    }

    /// Presence probe that never decodes the payload. Restricted collections
    /// are probed through the content hash, so callers without read access can
    /// still check existence.
    pub fn exists(&mut self, id: &str) -> Result<bool> {
        match self.private_name() {
            None => Ok(self.ctx.get_state(id)?.is_some()),
            Some(name) => Ok(self.ctx.get_private_data_hash(&name, id)?.is_some()),
        }
    }

    /// Fail with `AlreadyDeleted` when the id's history carries a tombstone.
    ///
    /// Only world state exposes per-key history; for restricted collections
    /// this guard is vacuous, matching the substrate's capabilities.
    pub fn assert_not_tombstoned(&mut self, id: &str) -> Result<()> {
        if self.collection != Collection::World {
            return Ok(());
        }
        let history = self.ctx.history_for_key(id)?;
        match history.first() {
            Some(newest) if newest.is_delete => Err(Error::already_deleted(id)),
            _ => Ok(()),
        }
    }

    /// Validate fields against the schema and store a new record.
    ///
    /// Fails `Validation` on a blank required field, `AlreadyExists` when the
    /// id is live, and `AlreadyDeleted` when the id was deleted at any earlier
    /// point of committed history. Deleted ids are never reused.
    pub fn create(&mut self, id: &str, fields: FieldMap) -> Result<Record> {
        let record = self.schema.build_record(id, fields)?;
        if self.exists(id)? {
            return Err(Error::already_exists(id));
        }
        self.assert_not_tombstoned(id)?;
        self.put(&record)?;
        debug!(kind = %self.schema.kind, id, "record created");
        Ok(record)
    }

    /// Read and decode a record.
    pub fn read(&mut self, id: &str) -> Result<Record> {
        match self.get_raw(id)? {
            Some(bytes) => self.schema.decode(&bytes),
            None => Err(Error::not_found(id)),
        }
    }

    /// Persist a record under its id, overwriting the stored payload.
    pub fn put(&mut self, record: &Record) -> Result<()> {
        let bytes = record.to_bytes()?;
        match self.private_name() {
            None => self.ctx.put_state(&record.id, bytes),
            Some(name) => self.ctx.put_private_data(&name, &record.id, bytes),
        }
    }

    /// Delete a record. A second delete of the same id fails `AlreadyDeleted`,
    /// detected through the history tombstone; an id that never existed fails
    /// `NotFound`.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.assert_not_tombstoned(id)?;
        if !self.exists(id)? {
            return Err(Error::not_found(id));
        }
        match self.private_name() {
            None => self.ctx.delete_state(id)?,
            Some(name) => self.ctx.delete_private_data(&name, id)?,
        }
        debug!(kind = %self.schema.kind, id, "record deleted");
        Ok(())
    }

    /// Lexicographic key-range scan, `end` exclusive, empty bounds open-ended.
    /// Records of other kinds sharing the key space are skipped.
    pub fn scan_range(&mut self, start: &str, end: &str) -> Result<Vec<Record>> {
        let entries = match self.private_name() {
            None => self.ctx.get_state_by_range(start, end)?,
            Some(name) => self.ctx.get_private_data_by_range(&name, start, end)?,
        };
        let mut records = Vec::new();
        for entry in entries {
            let record = Record::from_bytes(&entry.value)?;
            if record.kind == self.schema.kind {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Structural field-equality query with an optional one-field sort. The
    /// schema's kind tag is always part of the predicate. Unpaginated;
    /// intended for small result sets.
    pub fn query(&mut self, selector: Selector, sort: Option<&SortSpec>) -> Result<Vec<Record>> {
        let selector = self.scoped(selector);
        let entries = match self.private_name() {
            None => self.ctx.query_state(&selector, sort)?,
            Some(name) => self.ctx.query_private_data(&name, &selector, sort)?,
        };
        self.decode_all(entries)
    }

    /// Same predicate semantics as [`AssetRepository::query`], bounded to
    /// `page_size` records per window. An empty bookmark requests the first
    /// window; iterating until the returned bookmark is empty yields
    /// non-overlapping, exhaustive windows.
    pub fn query_paginated(
        &mut self,
        selector: Selector,
        page_size: u32,
        bookmark: &str,
    ) -> Result<PageWindow> {
        let selector = self.scoped(selector);
        let page = match self.private_name() {
            None => self
                .ctx
                .query_state_with_pagination(&selector, page_size, bookmark)?,
            Some(name) => self.ctx.query_private_data_with_pagination(
                &name, &selector, page_size, bookmark,
            )?,
        };
        Ok(PageWindow {
            fetched_count: page.fetched_count,
            records: self.decode_all(page.entries)?,
            bookmark: page.bookmark,
        })
    }

    fn scoped(&self, selector: Selector) -> Selector {
        selector.field("assetType", self.schema.kind.as_str())
    }

    fn decode_all(&self, entries: Vec<KeyValue>) -> Result<Vec<Record>> {
        entries
            .into_iter()
            .map(|entry| self.schema.decode(&entry.value))
            .collect()
    }
}
