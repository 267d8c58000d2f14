//! Organization identity labels
//!
//! The substrate attaches one [`OrgLabel`] to every invocation. It is a trusted
//! claim: the ledger's membership layer has already authenticated the caller,
//! so the contract layer compares labels and never re-verifies them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The organization under which the current invocation executes.
///
/// Opaque to the core: two labels are either equal or not. Allow-lists in the
/// access policy are sets of these.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgLabel(String);

impl OrgLabel {
    /// Wrap a raw label string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The raw label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgLabel {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for OrgLabel {
    fn from(label: String) -> Self {
        Self(label)
    }
}
