// Copyright 2025 Cowboy AI, LLC.

//! Change listener for the investments collection
//!
//! The platform invokes the handler once per document change, potentially
//! concurrently. The handler owns no mutable state across invocations, so
//! concurrent invocations need no locking; each one filters out self-caused
//! and meaningless events and hands the affected project ids to the
//! reconciler.

use crate::errors::EngineError;
use crate::guard::is_self_caused;
use crate::infrastructure::{DocumentChange, DocumentStore};
use crate::records::{AGGREGATION_FIELDS, FIELD_PROJECT_ID, INVESTMENTS_COLLECTION};
use crate::reconciler::Reconciler;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Trait for handling a single change event
#[async_trait]
pub trait EventHandler<E>: Send + Sync {
    /// Error type for this handler
    type Error;

    /// Handle one event
    async fn handle(&self, event: E) -> Result<(), Self::Error>;
}

/// Handles investment document changes by reconciling the affected projects
pub struct InvestmentChangeHandler {
    reconciler: Reconciler,
}

impl InvestmentChangeHandler {
    /// Create a handler delegating to the given reconciler
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// Distinct project ids referenced by the before and/or after state.
    ///
    /// A `projectId` edit moves the investment between two projects; both
    /// need a recompute.
    fn affected_projects(change: &DocumentChange) -> Vec<String> {
        let mut projects = Vec::with_capacity(2);
        for doc in [change.before.as_ref(), change.after.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Some(project_id) = doc.get(FIELD_PROJECT_ID).and_then(|v| v.as_str()) {
                if !project_id.is_empty() && !projects.iter().any(|p| p == project_id) {
                    projects.push(project_id.to_string());
                }
            }
        }
        projects
    }
}

#[async_trait]
impl EventHandler<DocumentChange> for InvestmentChangeHandler {
    type Error = EngineError;

    async fn handle(&self, change: DocumentChange) -> Result<(), EngineError> {
        if is_self_caused(&change) {
            debug!(investment_id = %change.id, "Dropping self-caused normalization write");
            return Ok(());
        }

        if !AGGREGATION_FIELDS
            .iter()
            .any(|field| change.field_changed(field))
        {
            debug!(investment_id = %change.id, "Dropping no-op edit");
            return Ok(());
        }

        let projects = Self::affected_projects(&change);
        if projects.is_empty() {
            debug!(investment_id = %change.id, "Investment references no project");
            return Ok(());
        }

        // Affected projects are reconciled independently; no ordering is
        // guaranteed or required between them.
        let mut first_error = None;
        for project_id in projects {
            match self.reconciler.reconcile(&project_id).await {
                Ok(_) => {}
                Err(error) if error.is_not_found() => {
                    debug!(project_id = %project_id, "Project missing; nothing to reconcile");
                }
                Err(error) => {
                    warn!(
                        project_id = %project_id,
                        error = %error,
                        "Trigger-driven reconciliation failed"
                    );
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Drives an [`EventHandler`] from a store's investment change subscription.
///
/// Handler failures are logged and the loop continues; the store's
/// at-least-once delivery plus the reconciler's idempotence make the next
/// event or a manual backfill repair any missed state.
pub struct ChangeFeedService {
    task: JoinHandle<()>,
}

impl ChangeFeedService {
    /// Subscribe to the investments collection and spawn the dispatch loop
    pub async fn start(
        store: Arc<dyn DocumentStore>,
        handler: Arc<dyn EventHandler<DocumentChange, Error = EngineError>>,
    ) -> Result<Self, EngineError> {
        let mut stream = store.subscribe(INVESTMENTS_COLLECTION).await?;
        let task = tokio::spawn(async move {
            while let Some(change) = stream.next().await {
                if let Err(error) = handler.handle(change).await {
                    warn!(error = %error, "Change handler failed; awaiting next event");
                }
            }
            debug!("Investment change feed closed");
        });
        Ok(Self { task })
    }

    /// Stop the dispatch loop
    pub fn shutdown(self) {
        self.task.abort();
    }
}
