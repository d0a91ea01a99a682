// Copyright 2025 Cowboy AI, LLC.

//! Error types for reconciliation operations

use crate::infrastructure::StoreError;
use thiserror::Error;

/// Errors that can occur while reconciling funding aggregates
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Referenced project does not exist; reconciliation aborts with no side effects
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Operation called with an empty or malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller has no identity
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Caller is identified but lacks an administrative role
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The status-normalization batch write failed; the project aggregate was
    /// not written and the invocation may be retried
    #[error("Transient write failure: {0}")]
    TransientWriteFailure(String),

    /// Error from the underlying document store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for reconciliation operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::ProjectNotFound(_))
    }

    /// Check if this error is transient and the operation safe to retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::TransientWriteFailure(_) | EngineError::Store(_)
        )
    }

    /// Check if this is an authentication or authorization error
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EngineError::Unauthenticated(_) | EngineError::PermissionDenied(_)
        )
    }
}
