// Copyright 2025 Cowboy AI, LLC.

//! In-memory document store
//!
//! Backs tests and local runs. Mutations fan out as [`DocumentChange`]
//! notifications over a broadcast channel, mimicking the at-least-once,
//! unordered delivery of a managed document database's change feed.

use super::document_store::{
    Document, DocumentChange, DocumentChangeStream, DocumentStore, StoreError, WriteOp,
};
use async_trait::async_trait;
use futures::StreamExt;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;

type Collections = HashMap<String, IndexMap<String, Map<String, Value>>>;

/// Read and write counters for the in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Point reads, queries and id listings served
    pub reads: u64,

    /// Individual document mutations applied (a batch of three counts three)
    pub writes: u64,
}

/// In-memory document store with change broadcasting
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    changes: broadcast::Sender<DocumentChange>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(1024);
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            changes,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Current read/write counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
        }
    }

    /// Replace a document wholesale, as an external actor would.
    ///
    /// Emits a change notification like any other write.
    pub async fn put(&self, collection: &str, id: &str, data: Map<String, Value>) {
        let change = {
            let mut collections = self.collections.write().await;
            let bucket = collections.entry(collection.to_string()).or_default();
            let before = bucket
                .get(id)
                .map(|data| Document::new(id, data.clone()));
            bucket.insert(id.to_string(), data.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            DocumentChange {
                collection: collection.to_string(),
                id: id.to_string(),
                before,
                after: Some(Document::new(id, data)),
            }
        };
        let _ = self.changes.send(change);
    }

    /// Delete a document, as an external actor would
    pub async fn remove(&self, collection: &str, id: &str) {
        let change = {
            let mut collections = self.collections.write().await;
            let Some(bucket) = collections.get_mut(collection) else {
                return;
            };
            let Some(data) = bucket.shift_remove(id) else {
                return;
            };
            self.writes.fetch_add(1, Ordering::SeqCst);
            DocumentChange {
                collection: collection.to_string(),
                id: id.to_string(),
                before: Some(Document::new(id, data)),
                after: None,
            }
        };
        let _ = self.changes.send(change);
    }

    fn apply_write(
        collections: &mut Collections,
        write: WriteOp,
        emitted: &mut Vec<DocumentChange>,
    ) {
        match write {
            WriteOp::Set {
                collection,
                id,
                data,
            } => {
                let bucket = collections.entry(collection.clone()).or_default();
                let before = bucket.get(&id).map(|d| Document::new(&id, d.clone()));
                bucket.insert(id.clone(), data.clone());
                emitted.push(DocumentChange {
                    collection,
                    id: id.clone(),
                    before,
                    after: Some(Document::new(&id, data)),
                });
            }
            WriteOp::Merge {
                collection,
                id,
                fields,
            } => {
                let bucket = collections.entry(collection.clone()).or_default();
                let before = bucket.get(&id).map(|d| Document::new(&id, d.clone()));
                let merged = bucket.entry(id.clone()).or_default();
                for (key, value) in fields {
                    merged.insert(key, value);
                }
                let after = Document::new(&id, merged.clone());
                emitted.push(DocumentChange {
                    collection,
                    id,
                    before,
                    after: Some(after),
                });
            }
            WriteOp::Delete { collection, id } => {
                let Some(bucket) = collections.get_mut(&collection) else {
                    return;
                };
                let Some(data) = bucket.shift_remove(&id) else {
                    return;
                };
                emitted.push(DocumentChange {
                    collection,
                    id: id.clone(),
                    before: Some(Document::new(&id, data)),
                    after: None,
                });
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|bucket| bucket.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let collections = self.collections.read().await;
        let Some(bucket) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(bucket
            .iter()
            .filter(|(_, data)| data.get(field) == Some(value))
            .map(|(id, data)| Document::new(id, data.clone()))
            .collect())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.commit_batch(vec![WriteOp::Merge {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        }])
        .await
    }

    async fn commit_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        let emitted = {
            let mut collections = self.collections.write().await;
            let mut emitted = Vec::with_capacity(writes.len());
            for write in writes {
                Self::apply_write(&mut collections, write, &mut emitted);
            }
            self.writes.fetch_add(emitted.len() as u64, Ordering::SeqCst);
            emitted
        };

        // Notify after the lock is released; a batch is atomic with respect to
        // readers but its notifications are individual per-document events.
        for change in emitted {
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<DocumentChangeStream, StoreError> {
        let collection = collection.to_string();
        let receiver = self.changes.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(move |item| {
            let collection = collection.clone();
            async move {
                match item {
                    Ok(change) if change.collection == collection => Some(change),
                    _ => None,
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
