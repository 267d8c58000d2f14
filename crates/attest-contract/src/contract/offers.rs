//! Restricted job-offer operations
//!
//! Offers live in a restricted collection. Their field values arrive through
//! the transaction's transient map, never through public arguments, and every
//! read is policy-guarded because it leaks cross-organization private content.

use crate::config::DeploymentConfig;
use crate::notify::EventNotifier;
use crate::policy::{Operation, PolicyTable};
use crate::repository::AssetRepository;
use crate::schemas::offer_schema;
use attest_core::{FieldMap, Record, RecordSchema, Result};
use attest_ledger::{Selector, TransactionContext};
use serde_json::json;
use tracing::info;

/// Operations over the restricted offers collection.
pub struct OfferContract<'a> {
    policy: &'a PolicyTable,
    config: &'a DeploymentConfig,
    schema: RecordSchema,
}

impl<'a> OfferContract<'a> {
    pub(crate) fn new(policy: &'a PolicyTable, config: &'a DeploymentConfig) -> Self {
        Self {
            policy,
            config,
            schema: offer_schema(),
        }
    }

    /// Content-hash presence probe; does not require read access.
    pub fn exists<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<bool> {
        self.repo(ctx).exists(id)
    }

    /// Store a new offer from the invocation's transient fields.
    pub fn create<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<String> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Create)?;

        let fields: FieldMap = ctx
            .transient()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        self.repo(ctx).create(id, fields)?;

        // Payload carries the id only; the offer content stays private.
        EventNotifier::emit(ctx, "CreateOffer", json!({ "offerId": id }));
        info!(id, "offer created");
        Ok(format!("Offer {id} added successfully"))
    }

    /// Read one offer. Policy-guarded: plaintext is restricted.
    pub fn read<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<Record> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Read)?;
        self.repo(ctx).read(id)
    }

    /// Delete one offer.
    pub fn delete<C: TransactionContext>(&self, ctx: &mut C, id: &str) -> Result<String> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Delete)?;
        self.repo(ctx).delete(id)?;
        info!(id, "offer deleted");
        Ok(format!("Successfully deleted offer {id}"))
    }

    /// All offers. Policy-guarded like [`OfferContract::read`].
    pub fn get_all<C: TransactionContext>(&self, ctx: &mut C) -> Result<Vec<Record>> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Read)?;
        self.repo(ctx).query(Selector::new(), None)
    }

    /// Lexicographic id-range scan over the restricted collection.
    pub fn get_by_range<C: TransactionContext>(
        &self,
        ctx: &mut C,
        start: &str,
        end: &str,
    ) -> Result<Vec<Record>> {
        self.policy
            .require(ctx.client_org(), &self.schema.kind, Operation::Read)?;
        self.repo(ctx).scan_range(start, end)
    }

    fn repo<'c, C: TransactionContext>(&'c self, ctx: &'c mut C) -> AssetRepository<'c, C> {
        AssetRepository::private(ctx, &self.schema, self.config.offers_collection.clone())
    }
}
