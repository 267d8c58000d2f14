//! Reconciliation engine
//!
//! Atomically matches a restricted candidate record against a publicly held
//! target on the deployment-configured field set. On equality the candidate is
//! consumed (deleted from its collection) and the target advances to
//! `Matched` with the candidate's owner, both in the same invocation, so the
//! substrate commits the pair as one unit or not at all. The engine performs
//! no compensation of its own.

use crate::config::DeploymentConfig;
use crate::policy::{Operation, PolicyTable};
use crate::repository::AssetRepository;
use attest_core::{Error, LifecycleStatus, Record, RecordSchema, Result};
use attest_ledger::TransactionContext;
use tracing::info;

/// Couples "consume the restricted candidate" with "advance the public
/// target" as one indivisible domain operation.
pub struct ReconciliationEngine<'a> {
    policy: &'a PolicyTable,
    config: &'a DeploymentConfig,
}

impl<'a> ReconciliationEngine<'a> {
    /// Engine over the deployment's policy and match-field configuration.
    pub fn new(policy: &'a PolicyTable, config: &'a DeploymentConfig) -> Self {
        Self { policy, config }
    }

    /// Reconcile `candidate_id` (restricted) against `target_id` (public).
    ///
    /// Fails `PermissionDenied` unless the caller's organization holds the
    /// match grant for the target's kind, `NotFound` when either record is
    /// absent, `Validation` when the target is already confirmed or the
    /// candidate carries no owner, and `MatchConflict` (with neither record
    /// mutated) when any configured match field differs.
    pub fn reconcile<C: TransactionContext>(
        &self,
        ctx: &mut C,
        schema: &RecordSchema,
        target_id: &str,
        candidate_id: &str,
    ) -> Result<Record> {
        self.policy
            .require(ctx.client_org(), &schema.kind, Operation::Match)?;

        let candidate = self.read_candidate(ctx, candidate_id)?;
        let mut target = AssetRepository::world(ctx, schema).read(target_id)?;

        let status = LifecycleStatus::parse(target.field("status").unwrap_or(""));
        if matches!(status, LifecycleStatus::Confirmed { .. }) {
            return Err(Error::validation(
                "status",
                "confirmed record cannot be matched",
            ));
        }

        if !target.fields_equal(&candidate, &self.config.match_fields) {
            return Err(Error::match_conflict(target_id, candidate_id));
        }

        let owner = candidate
            .field(&self.config.owner_field)
            .ok_or_else(|| {
                Error::validation(&self.config.owner_field, "missing on candidate record")
            })?
            .to_string();

        // Coupled dual-write: both sides commit with this invocation or
        // neither does.
        ctx.delete_private_data(&self.config.offers_collection, candidate_id)?;
        target.set_field("status", LifecycleStatus::matched().to_string());
        target.set_field(self.config.owner_field.clone(), owner.clone());
        AssetRepository::world(ctx, schema).put(&target)?;

        info!(target_id, candidate_id, owner = %owner, "candidate reconciled against target");
        Ok(target)
    }

    fn read_candidate<C: TransactionContext>(
        &self,
        ctx: &mut C,
        candidate_id: &str,
    ) -> Result<Record> {
        let bytes = ctx
            .get_private_data(&self.config.offers_collection, candidate_id)?
            .ok_or_else(|| Error::not_found(candidate_id))?;
        // Candidates are compared field-wise; their kind tag is not forced to
        // match the target's.
        Record::from_bytes(&bytes)
    }
}
