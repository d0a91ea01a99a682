// Copyright 2025 Cowboy AI, LLC.

//! Aggregate calculator for project funding totals
//!
//! The three derived fields on a project are always recomputed from the full
//! current investment set, never incremented. The computation is a pure
//! function of its input and independent of input order, which is what makes
//! concurrent and redelivered recomputations safe without coordination.

use crate::infrastructure::Document;
use crate::records::{
    CanonicalInvestment, FIELD_CURRENT_AMOUNT, FIELD_INVESTORS_COUNT, FIELD_PENDING_AMOUNT,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Derived funding totals for one project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingAggregates {
    /// Sum of amounts whose canonical status is COUNTED
    pub current_amount: f64,
    /// Sum of amounts whose canonical status is PENDING
    pub pending_amount: f64,
    /// Distinct investor ids among COUNTED investments
    pub investors_count: u64,
}

impl FundingAggregates {
    /// Aggregates of an empty investment set
    pub fn zero() -> Self {
        Self {
            current_amount: 0.0,
            pending_amount: 0.0,
            investors_count: 0,
        }
    }

    /// Read the derived fields already persisted on a project document.
    ///
    /// Returns `None` when any of the three fields is missing or malformed,
    /// which callers treat as "differs from any computed value".
    pub fn from_document(doc: &Document) -> Option<Self> {
        let current = doc.data.get(FIELD_CURRENT_AMOUNT)?.as_f64()?;
        let pending = doc.data.get(FIELD_PENDING_AMOUNT)?.as_f64()?;
        let investors = doc.data.get(FIELD_INVESTORS_COUNT)?.as_u64()?;
        Some(Self {
            current_amount: current,
            pending_amount: pending,
            investors_count: investors,
        })
    }

    /// The derived fields as a merge-write payload
    pub fn as_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(FIELD_CURRENT_AMOUNT.to_string(), Value::from(self.current_amount));
        fields.insert(FIELD_PENDING_AMOUNT.to_string(), Value::from(self.pending_amount));
        fields.insert(
            FIELD_INVESTORS_COUNT.to_string(),
            Value::from(self.investors_count),
        );
        fields
    }
}

/// Compute the funding aggregates over a project's full investment set
pub fn compute_aggregates(investments: &[CanonicalInvestment]) -> FundingAggregates {
    let mut current_amount = 0.0;
    let mut pending_amount = 0.0;
    let mut investors: BTreeSet<&str> = BTreeSet::new();

    for inv in investments {
        if inv.status.is_counted() {
            current_amount += inv.amount;
            if let Some(uid) = inv.investor_uid.as_deref() {
                investors.insert(uid);
            }
        } else if inv.status.is_pending() {
            pending_amount += inv.amount;
        }
        // rejected, cancelled, unresolvable: feeds neither total
    }

    FundingAggregates {
        current_amount,
        pending_amount,
        investors_count: investors.len() as u64,
    }
}
