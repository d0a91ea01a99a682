// Copyright 2025 Cowboy AI, LLC.

//! Reconciler for project funding aggregates
//!
//! Re-derives a project's `currentAmount`, `pendingAmount` and
//! `investorsCount` from the full current set of its investments. There is no
//! incremental bookkeeping: every invocation reads everything and recomputes,
//! so replays, redeliveries and concurrent invocations all converge on a
//! value that is internally consistent for the snapshot each one read.

use crate::aggregates::{compute_aggregates, FundingAggregates};
use crate::errors::{EngineError, EngineResult};
use crate::guard::{guard_nonce, GUARD_FIELD};
use crate::infrastructure::{DocumentStore, WriteOp};
use crate::records::{
    CanonicalInvestment, InvestmentView, FIELD_PROJECT_ID, FIELD_STATUS, FIELD_UPDATED_AT,
    INVESTMENTS_COLLECTION, PROJECTS_COLLECTION,
};
use crate::status::InvestmentStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a full backfill over all projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSummary {
    /// Projects reconciled successfully
    pub reconciled: u64,
    /// Projects that failed and were skipped
    pub failed: u64,
}

/// Recomputes and persists derived funding aggregates
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
}

impl Reconciler {
    /// Create a reconciler over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Reconcile one project's aggregates from its current investment set.
    ///
    /// Loads the project (absent project aborts with no side effects), loads
    /// the complete investment set, rewrites any legacy statuses in one
    /// guarded atomic batch, recomputes the three derived fields, and merges
    /// them onto the project unless they already match what is persisted. A
    /// failed normalization batch surfaces as a transient error before the
    /// project write, so a retry re-derives from a consistent state.
    pub async fn reconcile(&self, project_id: &str) -> EngineResult<FundingAggregates> {
        let project = self
            .store
            .get(PROJECTS_COLLECTION, project_id)
            .await?
            .ok_or_else(|| EngineError::ProjectNotFound(project_id.to_string()))?;

        let investment_docs = self
            .store
            .query_eq(
                INVESTMENTS_COLLECTION,
                FIELD_PROJECT_ID,
                &Value::String(project_id.to_string()),
            )
            .await?;

        let nonce = guard_nonce();
        let now = Value::String(Utc::now().to_rfc3339());
        let mut canonical = Vec::with_capacity(investment_docs.len());
        let mut rewrites = Vec::new();

        for doc in &investment_docs {
            let view = InvestmentView::from_document(doc);
            let (status, rewritten) = view.canonical_status();

            if status == InvestmentStatus::Unresolvable {
                debug!(
                    project_id = %project_id,
                    investment_id = %view.id,
                    raw_status = ?view.raw_status,
                    "Unresolvable investment status; excluded from aggregates"
                );
            }

            if rewritten {
                let mut fields = Map::new();
                fields.insert(FIELD_STATUS.to_string(), Value::from(status.as_str()));
                fields.insert(GUARD_FIELD.to_string(), nonce.clone());
                fields.insert(FIELD_UPDATED_AT.to_string(), now.clone());
                rewrites.push(WriteOp::Merge {
                    collection: INVESTMENTS_COLLECTION.to_string(),
                    id: view.id.clone(),
                    fields,
                });
            }

            canonical.push(CanonicalInvestment::new(&view, status));
        }

        if !rewrites.is_empty() {
            let count = rewrites.len();
            self.store
                .commit_batch(rewrites)
                .await
                .map_err(|e| EngineError::TransientWriteFailure(e.to_string()))?;
            debug!(
                project_id = %project_id,
                rewrites = count,
                "Normalized legacy investment statuses"
            );
        }

        let aggregates = compute_aggregates(&canonical);

        if FundingAggregates::from_document(&project) == Some(aggregates) {
            debug!(project_id = %project_id, "Aggregates unchanged; skipping project write");
            return Ok(aggregates);
        }

        let mut fields = aggregates.as_fields();
        fields.insert(FIELD_UPDATED_AT.to_string(), now);
        self.store
            .merge(PROJECTS_COLLECTION, project_id, fields)
            .await?;

        info!(
            project_id = %project_id,
            current_amount = aggregates.current_amount,
            pending_amount = aggregates.pending_amount,
            investors_count = aggregates.investors_count,
            "Reconciled project aggregates"
        );

        Ok(aggregates)
    }

    /// Reconcile every project sequentially, best-effort.
    ///
    /// A failure on one project is logged and counted but does not abort the
    /// remaining ones.
    pub async fn reconcile_all(&self) -> EngineResult<BackfillSummary> {
        let project_ids = self.store.list_ids(PROJECTS_COLLECTION).await?;
        let mut summary = BackfillSummary {
            reconciled: 0,
            failed: 0,
        };

        for project_id in project_ids {
            match self.reconcile(&project_id).await {
                Ok(_) => summary.reconciled += 1,
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        project_id = %project_id,
                        error = %error,
                        "Backfill reconciliation failed; continuing"
                    );
                }
            }
        }

        info!(
            reconciled = summary.reconciled,
            failed = summary.failed,
            "Backfill complete"
        );
        Ok(summary)
    }
}
