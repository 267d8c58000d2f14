//! Static access policy
//!
//! Allow-lists live in one [`PolicyTable`] built from deployment configuration
//! at startup, queried uniformly by every guarded path, and never mutated at
//! runtime. No operation compares organization labels on its own.

use attest_core::{Error, OrgLabel, RecordKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Guarded operation classes.
///
/// Read is only consulted where a read can leak cross-organization private
/// content; public world-state reads are unguarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Create a record.
    Create,
    /// Read a restricted record.
    Read,
    /// Delete a record.
    Delete,
    /// Reconcile a restricted candidate against a public target.
    Match,
    /// Confirm a public record for an organization.
    Confirm,
    /// Rich-query a restricted collection.
    RestrictedQuery,
}

impl Operation {
    /// Stable name used in configuration and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Match => "match",
            Self::Confirm => "confirm",
            Self::RestrictedQuery => "restricted-query",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable `(record kind, operation) -> {organization}` allow-list table.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    allow: BTreeMap<(RecordKind, Operation), BTreeSet<OrgLabel>>,
}

impl PolicyTable {
    /// Start building a table.
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder {
            table: Self::default(),
        }
    }

    /// True when `org` appears in the allow-list for `(kind, operation)`.
    /// Absent entries allow nobody.
    pub fn allows(&self, org: &OrgLabel, kind: &RecordKind, operation: Operation) -> bool {
        self.allow
            .get(&(kind.clone(), operation))
            .is_some_and(|orgs| orgs.contains(org))
    }

    /// Fail fast with `PermissionDenied` unless `org` is allowed. Evaluated
    /// before any state change on every mutating path.
    pub fn require(&self, org: &OrgLabel, kind: &RecordKind, operation: Operation) -> Result<()> {
        if self.allows(org, kind, operation) {
            Ok(())
        } else {
            Err(Error::permission_denied(
                org.clone(),
                format!("{operation} on {kind}"),
            ))
        }
    }
}

/// Builder for [`PolicyTable`].
pub struct PolicyTableBuilder {
    table: PolicyTable,
}

impl PolicyTableBuilder {
    /// Grant `operation` on `kind` to the listed organizations.
    #[must_use]
    pub fn allow<I, L>(mut self, kind: impl Into<RecordKind>, operation: Operation, orgs: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<OrgLabel>,
    {
        self.table
            .allow
            .entry((kind.into(), operation))
            .or_default()
            .extend(orgs.into_iter().map(Into::into));
        self
    }

    /// Finish the table.
    pub fn build(self) -> PolicyTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PolicyTable {
        PolicyTable::builder()
            .allow("Result", Operation::Create, ["UniversityOrg"])
            .allow("OfferLetter", Operation::Read, ["CompanyOrg", "StudentOrg"])
            .build()
    }

    #[test]
    fn allows_only_listed_orgs() {
        let table = table();
        let kind = RecordKind::new("Result");
        assert!(table.allows(&"UniversityOrg".into(), &kind, Operation::Create));
        assert!(!table.allows(&"CompanyOrg".into(), &kind, Operation::Create));
    }

    #[test]
    fn absent_entry_allows_nobody() {
        let table = table();
        assert!(!table.allows(
            &"UniversityOrg".into(),
            &RecordKind::new("Result"),
            Operation::Delete
        ));
    }

    #[test]
    fn require_reports_org_and_operation() {
        let err = table()
            .require(
                &"CompanyOrg".into(),
                &RecordKind::new("Result"),
                Operation::Create,
            )
            .unwrap_err();
        match err {
            Error::PermissionDenied { org, operation } => {
                assert_eq!(org.as_str(), "CompanyOrg");
                assert_eq!(operation, "create on Result");
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[test]
    fn multiple_orgs_share_an_entry() {
        let table = table();
        let kind = RecordKind::new("OfferLetter");
        assert!(table.allows(&"CompanyOrg".into(), &kind, Operation::Read));
        assert!(table.allows(&"StudentOrg".into(), &kind, Operation::Read));
        assert!(!table.allows(&"UniversityOrg".into(), &kind, Operation::Read));
    }
}
