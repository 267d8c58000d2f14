//! Gateway-facing operation surface
//!
//! One operation per named capability, each taking primitive string/int
//! arguments and returning a string or a serializable record/collection; no
//! rich types cross this boundary. [`Contracts::dispatch`] additionally mirrors
//! the substrate's positional string-argument invocation shape, so the outward
//! gateway can route by operation name.

mod offers;
mod results;

pub use offers::OfferContract;
pub use results::ResultContract;

use crate::config::DeploymentConfig;
use crate::policy::PolicyTable;
use attest_core::{Error, Result};
use attest_ledger::TransactionContext;
use serde::Serialize;

/// The deployed contract set: compiled policy plus the per-kind operation
/// surfaces. Built once at startup from an injected [`DeploymentConfig`].
pub struct Contracts {
    policy: PolicyTable,
    config: DeploymentConfig,
}

impl Contracts {
    /// Compile the deployment configuration into a ready contract set.
    pub fn new(config: DeploymentConfig) -> Self {
        Self {
            policy: config.policy_table(),
            config,
        }
    }

    /// Credential-result operations.
    pub fn results(&self) -> ResultContract<'_> {
        ResultContract::new(&self.policy, &self.config)
    }

    /// Restricted-offer operations.
    pub fn offers(&self) -> OfferContract<'_> {
        OfferContract::new(&self.policy, &self.config)
    }

    /// Route a positional string-argument invocation to the named operation.
    ///
    /// Query results are returned as their JSON encoding; mutations return
    /// their success message. Unknown operations and arity mismatches fail
    /// `Validation` before any state is touched.
    pub fn dispatch<C: TransactionContext>(
        &self,
        ctx: &mut C,
        operation: &str,
        args: &[&str],
    ) -> Result<String> {
        let results = self.results();
        let offers = self.offers();
        match operation {
            "ResultExists" => {
                let [id] = expect_args(operation, args)?;
                to_json(&results.exists(ctx, id)?)
            }
            "CreateResult" => {
                let [id, student_id, total, obtained, percentage, status] =
                    expect_args(operation, args)?;
                results.create(ctx, id, student_id, total, obtained, percentage, status)
            }
            "ReadResult" => {
                let [id] = expect_args(operation, args)?;
                to_json(&results.read(ctx, id)?)
            }
            "DeleteResult" => {
                let [id] = expect_args(operation, args)?;
                results.delete(ctx, id)
            }
            "GetResultsByRange" => {
                let [start, end] = expect_args(operation, args)?;
                to_json(&results.get_by_range(ctx, start, end)?)
            }
            "GetAllResults" => {
                let [] = expect_args(operation, args)?;
                to_json(&results.get_all(ctx)?)
            }
            "GetResultHistory" => {
                let [id] = expect_args(operation, args)?;
                to_json(&results.history(ctx, id)?)
            }
            "GetResultsWithPagination" => {
                let [page_size, bookmark] = expect_args(operation, args)?;
                let page_size = parse_page_size(page_size)?;
                to_json(&results.get_with_pagination(ctx, page_size, bookmark)?)
            }
            "GetMatchingResults" => {
                let [id] = expect_args(operation, args)?;
                to_json(&results.get_matching(ctx, id)?)
            }
            "MatchResult" => {
                let [target_id, candidate_id] = expect_args(operation, args)?;
                results.match_result(ctx, target_id, candidate_id)
            }
            "ConfirmResult" => {
                let [id, org_name] = expect_args(operation, args)?;
                results.confirm(ctx, id, org_name)
            }
            "OfferExists" => {
                let [id] = expect_args(operation, args)?;
                to_json(&offers.exists(ctx, id)?)
            }
            "CreateOffer" => {
                let [id] = expect_args(operation, args)?;
                offers.create(ctx, id)
            }
            "ReadOffer" => {
                let [id] = expect_args(operation, args)?;
                to_json(&offers.read(ctx, id)?)
            }
            "DeleteOffer" => {
                let [id] = expect_args(operation, args)?;
                offers.delete(ctx, id)
            }
            "GetAllOffers" => {
                let [] = expect_args(operation, args)?;
                to_json(&offers.get_all(ctx)?)
            }
            "GetOffersByRange" => {
                let [start, end] = expect_args(operation, args)?;
                to_json(&offers.get_by_range(ctx, start, end)?)
            }
            unknown => Err(Error::validation(
                "operation",
                format!("unknown operation {unknown}"),
            )),
        }
    }
}

fn expect_args<'s, const N: usize>(operation: &str, args: &[&'s str]) -> Result<[&'s str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        Error::validation(
            "args",
            format!("{operation} takes {N} arguments, got {}", args.len()),
        )
    })
}

fn parse_page_size(raw: &str) -> Result<u32> {
    match raw.parse() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::validation("pageSize", "not a positive integer")),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_is_a_validation_error() {
        let contracts = Contracts::new(DeploymentConfig::default_profile("U", "C", "S"));
        let ledger = attest_ledger::MemoryLedger::new();
        let mut tx = ledger.begin("U", Default::default());
        let err = contracts.dispatch(&mut tx, "ReadResult", &[]).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "args"));
    }

    #[test]
    fn zero_page_size_is_rejected_before_the_query_runs() {
        let contracts = Contracts::new(DeploymentConfig::default_profile("U", "C", "S"));
        let ledger = attest_ledger::MemoryLedger::new();
        let mut tx = ledger.begin("U", Default::default());
        let err = contracts
            .dispatch(&mut tx, "GetResultsWithPagination", &["0", ""])
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "pageSize"));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let contracts = Contracts::new(DeploymentConfig::default_profile("U", "C", "S"));
        let ledger = attest_ledger::MemoryLedger::new();
        let mut tx = ledger.begin("U", Default::default());
        let err = contracts
            .dispatch(&mut tx, "MintTokens", &["x"])
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "operation"));
    }
}
