//! Deployment configuration
//!
//! Everything deployment-specific (which organizations may do what, the name
//! of the restricted collection, which fields reconciliation compares) is an
//! explicitly constructed value injected at startup. Nothing in this crate
//! reads ambient global state.

use crate::policy::{Operation, PolicyTable};
use attest_core::{Error, Result};
use serde::Deserialize;

fn default_offers_collection() -> String {
    "Offers".to_string()
}

fn default_match_fields() -> Vec<String> {
    ["totalMarks", "obtainedMarks", "percentage"]
        .map(String::from)
        .to_vec()
}

fn default_owner_field() -> String {
    "owner".to_string()
}

/// One allow-list entry: organizations granted an operation on a record kind.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRule {
    /// Record kind the rule applies to.
    pub kind: String,
    /// Guarded operation.
    pub operation: Operation,
    /// Organizations granted the operation.
    pub orgs: Vec<String>,
}

/// Per-deployment configuration for the contract layer.
///
/// Loadable from TOML; see [`DeploymentConfig::from_toml_str`]. Allow-lists
/// are deployment data, never organization names baked into operation code,
/// so two deployments cannot drift apart silently.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    /// Name of the restricted collection holding offer records.
    #[serde(default = "default_offers_collection")]
    pub offers_collection: String,

    /// Fields reconciliation compares for exact equality.
    #[serde(default = "default_match_fields")]
    pub match_fields: Vec<String>,

    /// Candidate field that becomes the target's owner on a successful match.
    #[serde(default = "default_owner_field")]
    pub owner_field: String,

    /// Allow-list rules; compiled into a [`PolicyTable`] once at startup.
    #[serde(default)]
    pub policy: Vec<PolicyRule>,
}

impl DeploymentConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| Error::Serialization(err.to_string()))
    }

    /// The standard three-organization profile: the credential issuer writes
    /// and reconciles public results, the employer writes restricted offers,
    /// and the employer plus the subject organization may read them.
    pub fn default_profile(issuer: &str, employer: &str, subject: &str) -> Self {
        let rule = |kind: &str, operation: Operation, orgs: &[&str]| PolicyRule {
            kind: kind.to_string(),
            operation,
            orgs: orgs.iter().map(|org| org.to_string()).collect(),
        };
        Self {
            offers_collection: default_offers_collection(),
            match_fields: default_match_fields(),
            owner_field: default_owner_field(),
            policy: vec![
                rule("Result", Operation::Create, &[issuer]),
                rule("Result", Operation::Delete, &[issuer]),
                rule("Result", Operation::Match, &[issuer]),
                rule("Result", Operation::Confirm, &[issuer]),
                rule("Result", Operation::RestrictedQuery, &[issuer]),
                rule("OfferLetter", Operation::Create, &[employer]),
                rule("OfferLetter", Operation::Delete, &[employer]),
                rule("OfferLetter", Operation::Read, &[employer, subject]),
            ],
        }
    }

    /// Compile the allow-list rules into the immutable policy table.
    pub fn policy_table(&self) -> PolicyTable {
        let mut builder = PolicyTable::builder();
        for rule in &self.policy {
            builder = builder.allow(
                rule.kind.as_str(),
                rule.operation,
                rule.orgs.iter().map(String::as_str),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::RecordKind;

    #[test]
    fn default_profile_compiles_to_expected_grants() {
        let config = DeploymentConfig::default_profile("Uni", "Acme", "Students");
        let table = config.policy_table();
        let result = RecordKind::new("Result");
        let offer = RecordKind::new("OfferLetter");

        assert!(table.allows(&"Uni".into(), &result, Operation::Create));
        assert!(table.allows(&"Uni".into(), &result, Operation::Match));
        assert!(!table.allows(&"Acme".into(), &result, Operation::Create));
        assert!(table.allows(&"Acme".into(), &offer, Operation::Create));
        assert!(table.allows(&"Students".into(), &offer, Operation::Read));
        assert!(!table.allows(&"Students".into(), &offer, Operation::Delete));
    }

    #[test]
    fn loads_from_toml_with_defaults() {
        let config = DeploymentConfig::from_toml_str(
            r#"
            [[policy]]
            kind = "Result"
            operation = "create"
            orgs = ["Uni"]

            [[policy]]
            kind = "Result"
            operation = "restricted-query"
            orgs = ["Uni"]
            "#,
        )
        .unwrap();

        assert_eq!(config.offers_collection, "Offers");
        assert_eq!(config.owner_field, "owner");
        assert_eq!(
            config.match_fields,
            vec!["totalMarks", "obtainedMarks", "percentage"]
        );
        let table = config.policy_table();
        assert!(table.allows(
            &"Uni".into(),
            &RecordKind::new("Result"),
            Operation::RestrictedQuery
        ));
    }

    #[test]
    fn malformed_toml_is_a_serialization_error() {
        let err = DeploymentConfig::from_toml_str("policy = 3").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
