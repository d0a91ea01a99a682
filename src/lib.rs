// Copyright 2025 Cowboy AI, LLC.

//! # fundsync
//!
//! Aggregate reconciliation engine for an investment marketplace: keeps each
//! project's funding totals (`currentAmount`, `pendingAmount`,
//! `investorsCount`) consistent with the live set of investment records held
//! in a managed document store.
//!
//! The engine is built from small, separately testable pieces:
//! - **Status canonicalizer**: maps raw/legacy status strings to a closed
//!   enumeration, refusing to guess at unknown values
//! - **Aggregate calculator**: pure recompute of the three derived totals
//!   from the full current investment set
//! - **Write-loop guard**: marks the engine's own normalization writes so the
//!   change listener can drop them instead of re-triggering itself
//! - **Reconciler**: load, normalize (atomic batch), recompute, persist
//! - **Change listener**: filters change notifications and reconciles the
//!   affected projects
//! - **Admin RPC surface**: role-gated reconcile-one and backfill operations
//!
//! ## Design principles
//!
//! 1. **Full recompute over counters**: every trigger re-derives from current
//!    state, so redelivery, reordering and concurrent invocations self-heal
//! 2. **Fail-safe data handling**: malformed amounts and unknown statuses
//!    degrade to exclusion, never to an error that blocks a whole project
//! 3. **Idempotence**: reconciling an already-consistent project performs no
//!    writes at all

#![warn(missing_docs)]

pub mod aggregates;
pub mod errors;
pub mod guard;
pub mod infrastructure;
pub mod listener;
pub mod records;
pub mod reconciler;
pub mod rpc;
pub mod status;

pub use aggregates::{compute_aggregates, FundingAggregates};
pub use errors::{EngineError, EngineResult};
pub use infrastructure::{
    Document, DocumentChange, DocumentChangeStream, DocumentStore, InMemoryDocumentStore,
    StoreError, WriteOp,
};
pub use listener::{ChangeFeedService, EventHandler, InvestmentChangeHandler};
pub use records::{CanonicalInvestment, InvestmentView};
pub use reconciler::{BackfillSummary, Reconciler};
pub use rpc::{
    AdminReconcileApi, CallerContext, InMemoryRoleDirectory, ReconcileAllResponse, RoleDirectory,
};
pub use status::{canonicalize, InvestmentStatus};
