//! # Attest Ledger - Substrate Boundary
//!
//! The contract layer never talks to a real ledger directly; it runs against
//! the [`TransactionContext`] trait defined here. The trait mirrors what the
//! permissioned-ledger substrate guarantees per invocation: key-value state,
//! lexicographic range scans, structural queries with optional pagination,
//! per-key mutation history, named private collections with content-hash
//! existence probes, a transient field map, an event sink, and the caller's
//! organization identity.
//!
//! [`memory::MemoryLedger`] is a full in-process implementation used by tests
//! and local simulation. It models the substrate's concurrency contract as
//! optimistic concurrency: each transaction buffers its writes and records the
//! versions it read, and commit rejects the transaction with `CommitConflict`
//! when a concurrently committed transaction has touched any key it read.

#![forbid(unsafe_code)]

/// Transaction-context trait and the value types crossing it
pub mod context;

/// In-memory ledger with atomic commit and optimistic concurrency
pub mod memory;

/// Structural selectors and sort specifications
pub mod query;

pub use context::{KeyModification, KeyValue, RawPage, TransactionContext, TransientMap};
pub use memory::{MemoryLedger, MemoryTransaction};
pub use query::{Selector, SortOrder, SortSpec};
