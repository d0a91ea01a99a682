// Copyright 2025 Cowboy AI, LLC.

//! Write-loop guard for self-caused writes
//!
//! The reconciler's status-normalization writes land on the same collection
//! the change listener watches. Left unmarked they would re-trigger the
//! listener, which would reconcile again, forever. Every normalization write
//! therefore carries a marker field with a nonce fresh per batch; an incoming
//! change whose new state carries a marker that *changed* in that event is
//! self-caused and gets dropped at the top of the handler.
//!
//! Comparing the marker between before and after (rather than testing bare
//! presence) keeps documents the engine once normalized alive: a later
//! external edit leaves the stale marker untouched and is processed normally.

use crate::infrastructure::DocumentChange;
use serde_json::Value;
use uuid::Uuid;

/// Marker field written by the engine's own normalization writes
pub const GUARD_FIELD: &str = "_reconcilerWrite";

/// A fresh marker value for one normalization batch
pub fn guard_nonce() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Whether this change was caused by the engine's own normalization write
pub fn is_self_caused(change: &DocumentChange) -> bool {
    let after = match change.after.as_ref().and_then(|doc| doc.get(GUARD_FIELD)) {
        Some(value) if !value.is_null() => value,
        _ => return false,
    };
    let before = change.before.as_ref().and_then(|doc| doc.get(GUARD_FIELD));
    before != Some(after)
}
