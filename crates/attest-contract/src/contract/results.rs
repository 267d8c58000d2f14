//! Public credential-result operations

use crate::config::DeploymentConfig;
use crate::history::{HistoryReader, HistorySnapshot};
use crate::notify::EventNotifier;
use crate::policy::{Operation, PolicyTable};
use crate::reconcile::ReconciliationEngine;
use crate::repository::{AssetRepository, PageWindow};
use crate::schemas::result_schema;
use attest_core::{Error, FieldMap, LifecycleStatus, Record, RecordSchema, Result};
use attest_ledger::{Selector, TransactionContext};
use serde_json::json;
use tracing::info;

/// Operations over publicly held credential results.
///
/// Reads and queries are open to every organization; every mutation is
/// policy-guarded before any state is touched.
pub struct ResultContract<'a> {
    policy: &'a PolicyTable,
    config: &'a DeploymentConfig,
    schema: RecordSchema,
}

impl<'a> ResultContract<'a> {
    pub(crate) fn new(policy: &'a PolicyTable, config: &'a DeploymentConfig) -> Self {
        Self {
            policy,
            config,
            schema: result_schema(),
        }
    }

    /// Presence probe without decoding the payload.
    pub fn exists<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<bool> {
        AssetRepository::world(ctx, &self.schema).exists(id)
    }

    /// Store a new result.
    #[allow(clippy::too_many_arguments)]
    pub fn create<C: TransactionContext>(
        &self,
        ctx: &mut C,
        id: &str,
        student_id: &str,
        total_marks: &str,
        obtained_marks: &str,
        percentage: &str,
        status: &str,
    ) -> Result<String> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Create)?;

        let mut fields = FieldMap::new();
        fields.insert("studentId".into(), student_id.into());
        fields.insert("totalMarks".into(), total_marks.into());
        fields.insert("obtainedMarks".into(), obtained_marks.into());
        fields.insert("percentage".into(), percentage.into());
        fields.insert("status".into(), status.into());
        AssetRepository::world(ctx, &self.schema).create(id, fields)?;

        EventNotifier::emit(
            ctx,
            "CreateResult",
            json!({ "type": "Result creation", "percentage": percentage }),
        );
        info!(id, student_id, "result created");
        Ok(format!("Successfully added result {id}"))
    }

    /// Read one result.
    pub fn read<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<Record> {
        AssetRepository::world(ctx, &self.schema).read(id)
    }

    /// Delete a result. Confirmed results are terminal and cannot be deleted;
    /// a second delete fails `AlreadyDeleted` via the history tombstone.
    pub fn delete<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<String> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Delete)?;

        let mut repo = AssetRepository::world(ctx, &self.schema);
        repo.assert_not_tombstoned(id)?;
        let record = repo.read(id)?;
        let status = LifecycleStatus::parse(record.field("status").unwrap_or(""));
        if !status.can_delete() {
            return Err(Error::validation(
                "status",
                "confirmed record cannot be deleted",
            ));
        }
        repo.delete(id)?;
        info!(id, "result deleted");
        Ok(format!("Successfully deleted result {id}"))
    }

    /// Lexicographic id-range scan, end exclusive, empty bounds open-ended.
    pub fn get_by_range<C: TransactionContext>(
        &self,
        ctx: &mut C,
        start: &str,
        end: &str,
    ) -> Result<Vec<Record>> {
        AssetRepository::world(ctx, &self.schema).scan_range(start, end)
    }

    /// All results.
    pub fn get_all<C: TransactionContext>(&self, ctx: &mut C) -> Result<Vec<Record>> {
        AssetRepository::world(ctx, &self.schema).query(Selector::new(), None)
    }

    /// Committed mutation history of one result id.
    pub fn history<C: TransactionContext>(
        &self,
        ctx: &mut C,
        id: &str,
    ) -> Result<Vec<HistorySnapshot>> {
        HistoryReader::history(ctx, &self.schema, id)
    }

    /// One window of the all-results query.
    pub fn get_with_pagination<C: TransactionContext>(
        &self,
        ctx: &mut C,
        page_size: u32,
        bookmark: &str,
    ) -> Result<PageWindow> {
        AssetRepository::world(ctx, &self.schema).query_paginated(
            Selector::new(),
            page_size,
            bookmark,
        )
    }

    /// Candidates in the restricted collection whose match fields equal those
    /// of the given public result. Restricted query; policy-guarded.
    pub fn get_matching<C: TransactionContext>(
        &self,
        ctx: &mut C,
        result_id: &str,
    ) -> Result<Vec<Record>> {
        self.policy.require(
            ctx.client_org(),
            &self.schema.kind,
            Operation::RestrictedQuery,
        )?;

        let base = AssetRepository::world(ctx, &self.schema).read(result_id)?;
        let mut selector = Selector::new();
        for field in &self.config.match_fields {
            let value = base
                .field(field)
                .ok_or_else(|| Error::validation(field, "missing on base record"))?;
            selector = selector.field(field, value);
        }

        let entries = ctx.query_private_data(&self.config.offers_collection, &selector, None)?;
        entries
            .into_iter()
            .map(|entry| Record::from_bytes(&entry.value))
            .collect()
    }

    /// Reconcile a restricted candidate against this public result.
    pub fn match_result<C: TransactionContext>(
        &self,
        ctx: &mut C,
        target_id: &str,
        candidate_id: &str,
    ) -> Result<String> {
        let engine = ReconciliationEngine::new(self.policy, self.config);
        let target = engine.reconcile(ctx, &self.schema, target_id, candidate_id)?;
        let owner = target.field(&self.config.owner_field).unwrap_or("");

        EventNotifier::emit(
            ctx,
            "MatchResult",
            json!({ "targetId": target_id, "candidateId": candidate_id, "owner": owner }),
        );
        Ok(format!(
            "Consumed candidate {candidate_id} and assigned result {target_id} to {owner}"
        ))
    }

    /// Rewrite a result's status to an org-qualified confirmation.
    pub fn confirm<C: TransactionContext>(
        &self,
        ctx: &mut C,
        id: &str,
        org_name: &str,
    ) -> Result<String> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Confirm)?;
        if org_name.trim().is_empty() {
            return Err(Error::validation("organization", "must not be blank"));
        }

        let mut repo = AssetRepository::world(ctx, &self.schema);
        let mut record = repo.read(id)?;
        let status = LifecycleStatus::parse(record.field("status").unwrap_or(""));
        if !status.can_confirm() {
            return Err(Error::validation(
                "status",
                "record is already confirmed",
            ));
        }
        record.set_field(
            "status",
            LifecycleStatus::confirmed_for(org_name).to_string(),
        );
        repo.put(&record)?;

        EventNotifier::emit(
            ctx,
            "ConfirmResult",
            json!({ "resultId": id, "organization": org_name }),
        );
        info!(id, org_name, "result confirmed");
        Ok(format!("Result {id} successfully confirmed for {org_name}"))
    }
}
