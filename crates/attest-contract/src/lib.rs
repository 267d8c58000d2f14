//! # Attest Contract - Authorization, Query, and Reconciliation Layer
//!
//! The decision layer running atop a permissioned, replicated key-value
//! ledger: organization-scoped write authorization, generic asset lifecycle
//! management for schema-described record kinds, history replay, paginated
//! structural queries, and the reconciliation protocol that atomically links a
//! restricted-visibility record to a publicly queryable one.
//!
//! Every public operation executes inside one substrate transaction
//! ([`attest_ledger::TransactionContext`]) and follows the same control flow:
//! policy check, idempotence guard, repository access, optional best-effort
//! event, typed result. The substrate commits or discards the invocation
//! atomically; the layer performs no retries and no compensation.

#![forbid(unsafe_code)]

/// Deployment configuration, injected at startup
pub mod config;

/// Gateway-facing operation surface
pub mod contract;

/// History replay and audit snapshots
pub mod history;

/// Best-effort event notification
pub mod notify;

/// Static access policy table
pub mod policy;

/// Reconciliation engine
pub mod reconcile;

/// Generic schema-driven repository
pub mod repository;

/// Schemas for the shipped record kinds
pub mod schemas;

pub use config::{DeploymentConfig, PolicyRule};
pub use contract::{Contracts, OfferContract, ResultContract};
pub use history::{HistoryReader, HistorySnapshot};
pub use notify::EventNotifier;
pub use policy::{Operation, PolicyTable};
pub use reconcile::ReconciliationEngine;
pub use repository::{AssetRepository, Collection, PageWindow};
pub use schemas::{offer_schema, result_schema};
