// Copyright 2025 Cowboy AI, LLC.

//! Document store trait and related types
//!
//! The engine consumes a managed document database through this seam: point
//! reads by id, collection queries by equality filter, merge-style writes,
//! atomic multi-document batches, and a per-document change subscription.
//! Documents are schemaless JSON objects.

use async_trait::async_trait;
use futures::stream::Stream;
use serde_json::{Map, Value};
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur when working with the document store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// General storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// An atomic batch write was rejected; no document in the batch was written
    #[error("Batch aborted: {0}")]
    BatchAborted(String),

    /// Failed to serialize or deserialize document data
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A document with its id and payload
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its collection
    pub id: String,

    /// Schemaless document payload
    pub data: Map<String, Value>,
}

impl Document {
    /// Create a document from an id and payload
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Field accessor
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// A single write in an atomic batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Replace the full document payload, creating it if absent
    Set {
        /// Target collection
        collection: String,
        /// Target document id
        id: String,
        /// New payload
        data: Map<String, Value>,
    },

    /// Merge fields into the document, creating it if absent; fields not named
    /// are left untouched
    Merge {
        /// Target collection
        collection: String,
        /// Target document id
        id: String,
        /// Fields to merge
        fields: Map<String, Value>,
    },

    /// Delete the document if present
    Delete {
        /// Target collection
        collection: String,
        /// Target document id
        id: String,
    },
}

/// A change notification for a single document.
///
/// Creations carry no `before`, deletions no `after`. Delivery is
/// at-least-once and unordered; consumers must tolerate redelivery.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    /// Collection the document lives in
    pub collection: String,

    /// Document id
    pub id: String,

    /// Document state before the change, if it existed
    pub before: Option<Document>,

    /// Document state after the change, unless deleted
    pub after: Option<Document>,
}

impl DocumentChange {
    /// Whether the given field differs between the before and after states.
    ///
    /// Absent documents and absent fields compare as JSON null.
    pub fn field_changed(&self, field: &str) -> bool {
        let null = Value::Null;
        let before = self
            .before
            .as_ref()
            .and_then(|d| d.get(field))
            .unwrap_or(&null);
        let after = self
            .after
            .as_ref()
            .and_then(|d| d.get(field))
            .unwrap_or(&null);
        before != after
    }
}

/// Stream of change notifications for one collection
pub type DocumentChangeStream = Pin<Box<dyn Stream<Item = DocumentChange> + Send>>;

/// Document store trait for reading and writing collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read of one document by id
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents of a collection whose `field` equals `value`.
    ///
    /// The result is the complete matching set; there is no pagination.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// All document ids of a collection
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Merge fields into a single document, creating it if absent
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Apply a batch of writes atomically: either all land or none do
    async fn commit_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Subscribe to per-document change notifications for a collection
    async fn subscribe(&self, collection: &str) -> Result<DocumentChangeStream, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_field_changed_detects_diff() {
        let change = DocumentChange {
            collection: "investments".to_string(),
            id: "inv-1".to_string(),
            before: Some(Document::new("inv-1", map(json!({"status": "pending"})))),
            after: Some(Document::new("inv-1", map(json!({"status": "signed"})))),
        };
        assert!(change.field_changed("status"));
        assert!(!change.field_changed("amount"));
    }

    #[test]
    fn test_absent_field_compares_as_null() {
        let change = DocumentChange {
            collection: "investments".to_string(),
            id: "inv-1".to_string(),
            before: Some(Document::new("inv-1", map(json!({})))),
            after: Some(Document::new("inv-1", map(json!({"note": null})))),
        };
        assert!(!change.field_changed("note"));
    }

    #[test]
    fn test_creation_and_deletion_diff_against_null() {
        let created = DocumentChange {
            collection: "investments".to_string(),
            id: "inv-1".to_string(),
            before: None,
            after: Some(Document::new("inv-1", map(json!({"amount": 10})))),
        };
        assert!(created.field_changed("amount"));

        let deleted = DocumentChange {
            collection: "investments".to_string(),
            id: "inv-1".to_string(),
            before: Some(Document::new("inv-1", map(json!({"amount": 10})))),
            after: None,
        };
        assert!(deleted.field_changed("amount"));
    }

    #[test]
    fn test_store_error_display() {
        let error = StoreError::BatchAborted("contention".to_string());
        assert_eq!(error.to_string(), "Batch aborted: contention");
    }
}
