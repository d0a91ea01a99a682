// Copyright 2025 Cowboy AI, LLC.

//! Administrative RPC surface
//!
//! Two authenticated operations: reconcile one project, and reconcile every
//! project (backfill). Both require the caller's role to be administrative
//! and are rejected before any project read otherwise. Region and transport
//! wiring are operational concerns outside this module.

use crate::aggregates::FundingAggregates;
use crate::errors::{EngineError, EngineResult};
use crate::infrastructure::StoreError;
use crate::reconciler::Reconciler;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Roles allowed to invoke the administrative operations
pub const ADMIN_ROLES: &[&str] = &["admin", "superadmin"];

/// Identity and role lookup for RPC callers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Role of the given user, or `None` when the user has no role record
    async fn role_of(&self, uid: &str) -> Result<Option<String>, StoreError>;
}

/// Static role directory for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleDirectory {
    roles: HashMap<String, String>,
}

impl InMemoryRoleDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role to a user
    pub fn with_role(mut self, uid: impl Into<String>, role: impl Into<String>) -> Self {
        self.roles.insert(uid.into(), role.into());
        self
    }
}

#[async_trait]
impl RoleDirectory for InMemoryRoleDirectory {
    async fn role_of(&self, uid: &str) -> Result<Option<String>, StoreError> {
        Ok(self.roles.get(uid).cloned())
    }
}

/// The identity an RPC call arrived with
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    /// Authenticated user id; `None` when the call carries no identity
    pub uid: Option<String>,
}

impl CallerContext {
    /// A caller with a verified identity
    pub fn authenticated(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
        }
    }

    /// A caller with no identity
    pub fn anonymous() -> Self {
        Self { uid: None }
    }
}

/// Response of the backfill operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileAllResponse {
    /// Number of projects reconciled successfully
    pub reconciled_count: u64,
}

/// Authenticated, role-gated entry points to the reconciler
pub struct AdminReconcileApi {
    reconciler: Reconciler,
    roles: Arc<dyn RoleDirectory>,
}

impl AdminReconcileApi {
    /// Create the RPC surface over a reconciler and a role directory
    pub fn new(reconciler: Reconciler, roles: Arc<dyn RoleDirectory>) -> Self {
        Self { reconciler, roles }
    }

    /// Reconcile a single project on behalf of an administrator
    pub async fn reconcile_project(
        &self,
        caller: &CallerContext,
        project_id: &str,
    ) -> EngineResult<FundingAggregates> {
        let uid = self.authenticate(caller)?;

        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "projectId must not be empty".to_string(),
            ));
        }

        self.authorize(&uid).await?;
        info!(admin = %uid, project_id = %project_id, "Admin reconcile requested");
        self.reconciler.reconcile(project_id).await
    }

    /// Reconcile every project on behalf of an administrator (backfill)
    pub async fn reconcile_all_projects(
        &self,
        caller: &CallerContext,
    ) -> EngineResult<ReconcileAllResponse> {
        let uid = self.authenticate(caller)?;
        self.authorize(&uid).await?;

        info!(admin = %uid, "Admin backfill requested");
        let summary = self.reconciler.reconcile_all().await?;
        Ok(ReconcileAllResponse {
            reconciled_count: summary.reconciled,
        })
    }

    fn authenticate(&self, caller: &CallerContext) -> EngineResult<String> {
        caller
            .uid
            .clone()
            .ok_or_else(|| EngineError::Unauthenticated("call carries no identity".to_string()))
    }

    async fn authorize(&self, uid: &str) -> EngineResult<()> {
        let role = self.roles.role_of(uid).await?;
        match role {
            Some(role) if ADMIN_ROLES.contains(&role.as_str()) => Ok(()),
            Some(role) => Err(EngineError::PermissionDenied(format!(
                "role '{role}' is not administrative"
            ))),
            None => Err(EngineError::PermissionDenied(format!(
                "user '{uid}' has no role record"
            ))),
        }
    }
}
