//! Lifecycle states for publicly held records
//!
//! Public records move through `Open -> Matched -> Confirmed`, with deletion
//! reachable from any non-confirmed state. The status lives in an ordinary
//! string field so stored payloads stay flat; this module owns the parsing and
//! the transition rules.

use std::fmt;

/// Prefix of the org-qualified confirmation status string.
const CONFIRMED_PREFIX: &str = "Confirmed for ";

/// Status of the reconciliation state machine.
///
/// Anything that is not `Matched` or a confirmation string is an open state:
/// freshly created records carry caller-supplied statuses such as `Pass`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleStatus {
    /// Not yet matched; the stored status is whatever the creator supplied.
    Open(String),
    /// Reconciled against a restricted candidate record.
    Matched,
    /// Confirmed for the named organization. Terminal: confirmed records can
    /// no longer be deleted.
    Confirmed {
        /// Organization the confirmation was issued for.
        org: String,
    },
}

impl LifecycleStatus {
    /// Parse a stored status field.
    pub fn parse(raw: &str) -> Self {
        if raw == "Matched" {
            Self::Matched
        } else if let Some(org) = raw.strip_prefix(CONFIRMED_PREFIX) {
            Self::Confirmed {
                org: org.to_string(),
            }
        } else {
            Self::Open(raw.to_string())
        }
    }

    /// The matched status string.
    pub fn matched() -> Self {
        Self::Matched
    }

    /// An org-qualified confirmation status.
    pub fn confirmed_for(org: impl Into<String>) -> Self {
        Self::Confirmed { org: org.into() }
    }

    /// Deletion is terminal and reachable from any non-confirmed state.
    pub fn can_delete(&self) -> bool {
        !matches!(self, Self::Confirmed { .. })
    }

    /// Confirmation rewrites the status of any record that is not already
    /// confirmed; it does not require a prior match.
    pub fn can_confirm(&self) -> bool {
        !matches!(self, Self::Confirmed { .. })
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(raw) => f.write_str(raw),
            Self::Matched => f.write_str("Matched"),
            Self::Confirmed { org } => write!(f, "{CONFIRMED_PREFIX}{org}"),
        }
    }
}
