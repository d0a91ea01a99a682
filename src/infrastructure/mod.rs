// Copyright 2025 Cowboy AI, LLC.

//! Infrastructure layer for fundsync
//!
//! This module contains the document store abstraction the engine is written
//! against and the in-memory implementation used for tests and local runs:
//! - Document store trait with point reads, equality queries, merge writes,
//!   atomic batches and per-document change subscriptions
//! - In-memory store with change broadcasting and mutation statistics

pub mod document_store;
pub mod memory_store;

pub use document_store::{
    Document, DocumentChange, DocumentChangeStream, DocumentStore, StoreError, WriteOp,
};
pub use memory_store::{InMemoryDocumentStore, StoreStats};

#[cfg(test)]
pub use document_store::MockDocumentStore;
