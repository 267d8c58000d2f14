//! Unified error taxonomy for the contract layer
//!
//! Every operation returns exactly one of these kinds; the outward gateway is
//! responsible for mapping them to transport responses. The core never retries
//! and never substitutes a catch-all where a specific kind applies.

use crate::identity::OrgLabel;
use thiserror::Error;

/// Contract-layer error kinds.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller's organization is not in the allow-list for the operation
    #[error("organization {org} is not permitted to perform {operation}")]
    PermissionDenied {
        /// Organization that attempted the operation
        org: OrgLabel,
        /// Operation name as exposed to the gateway
        operation: String,
    },

    /// No live record under the requested id
    #[error("record {id} does not exist")]
    NotFound {
        /// The missing storage key
        id: String,
    },

    /// Create attempted on an id that is already live
    #[error("record {id} already exists")]
    AlreadyExists {
        /// The occupied storage key
        id: String,
    },

    /// The id's history already carries a tombstone
    #[error("record {id} was already deleted")]
    AlreadyDeleted {
        /// The tombstoned storage key
        id: String,
    },

    /// A required field was blank or missing, or a state transition is not allowed
    #[error("validation failed for {field}: {reason}")]
    Validation {
        /// Field or aspect that failed validation
        field: String,
        /// Human-readable reason
        reason: String,
    },

    /// Reconciliation field comparison found an inequality
    #[error("candidate {candidate_id} does not match target {target_id}")]
    MatchConflict {
        /// Public target record id
        target_id: String,
        /// Restricted candidate record id
        candidate_id: String,
    },

    /// A stored payload could not be decoded
    #[error("malformed stored payload: {0}")]
    Serialization(String),

    /// The substrate rejected the transaction at commit time
    #[error("transaction rejected by the ledger: {0}")]
    CommitConflict(String),
}

/// Result type for contract operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Permission denied for an operation.
    pub fn permission_denied(org: OrgLabel, operation: impl Into<String>) -> Self {
        Self::PermissionDenied {
            org,
            operation: operation.into(),
        }
    }

    /// Record id not found.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Record id already live.
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Record id already tombstoned.
    pub fn already_deleted(id: impl Into<String>) -> Self {
        Self::AlreadyDeleted { id: id.into() }
    }

    /// Validation failure on a named field or aspect.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Reconciliation mismatch between candidate and target.
    pub fn match_conflict(target_id: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        Self::MatchConflict {
            target_id: target_id.into(),
            candidate_id: candidate_id.into(),
        }
    }

    /// Commit-time rejection reported by the substrate.
    pub fn commit_conflict(msg: impl Into<String>) -> Self {
        Self::CommitConflict(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
