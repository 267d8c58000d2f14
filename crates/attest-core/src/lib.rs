//! # Attest Core - Foundation Types
//!
//! Leaf types shared by every layer of the attest contract stack: organization
//! identity, record kinds and field maps, schema descriptors, the public-record
//! lifecycle, and the error taxonomy.
//!
//! This crate holds no decision logic and no storage access. The authorization,
//! repository, and reconciliation layers live in `attest-contract`; the ledger
//! substrate boundary lives in `attest-ledger`.

#![forbid(unsafe_code)]

/// Organization identity labels
pub mod identity;

/// Records, field maps, and kind discriminators
pub mod record;

/// Schema descriptors driving the generic repository
pub mod schema;

/// Lifecycle states for publicly held records
pub mod status;

/// Unified error taxonomy
pub mod error;

pub use error::{Error, Result};
pub use identity::OrgLabel;
pub use record::{FieldMap, Record, RecordKind};
pub use schema::{FieldSpec, RecordSchema};
pub use status::LifecycleStatus;
