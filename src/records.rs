// Copyright 2025 Cowboy AI, LLC.

//! Typed, fail-safe views over store documents
//!
//! Project and investment documents live in a schemaless document store and
//! are written by several external actors. Reads through this module never
//! fail: a malformed field degrades to a safe default (zero amount, missing
//! id, unresolvable status) instead of blocking reconciliation of the whole
//! project.

use crate::infrastructure::Document;
use crate::status::{canonicalize, InvestmentStatus};
use serde_json::Value;

/// Collection holding project documents
pub const PROJECTS_COLLECTION: &str = "projects";

/// Collection holding investment documents
pub const INVESTMENTS_COLLECTION: &str = "investments";

/// Foreign key from investment to project
pub const FIELD_PROJECT_ID: &str = "projectId";

/// Investment amount, numeric when well-formed
pub const FIELD_AMOUNT: &str = "amount";

/// Raw status string, possibly a legacy value
pub const FIELD_STATUS: &str = "status";

/// Identifier of the investing user
pub const FIELD_INVESTOR_UID: &str = "investorUid";

/// Set once an investment is finalized; disambiguates the legacy `approved`
pub const FIELD_FINALIZED_AT: &str = "finalizedAt";

/// Stamped by every engine write
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// Derived: sum of COUNTED amounts
pub const FIELD_CURRENT_AMOUNT: &str = "currentAmount";

/// Derived: sum of PENDING amounts
pub const FIELD_PENDING_AMOUNT: &str = "pendingAmount";

/// Derived: distinct COUNTED investors
pub const FIELD_INVESTORS_COUNT: &str = "investorsCount";

/// The investment fields whose change is meaningful to aggregation.
///
/// A document edit that touches none of these is a no-op to the engine and
/// must not trigger a recompute.
pub const AGGREGATION_FIELDS: &[&str] = &[
    FIELD_PROJECT_ID,
    FIELD_STATUS,
    FIELD_INVESTOR_UID,
    FIELD_AMOUNT,
    FIELD_FINALIZED_AT,
];

/// Defensive read of one investment document
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentView {
    /// Document id
    pub id: String,
    /// Owning project, when present
    pub project_id: Option<String>,
    /// Investing user, when present
    pub investor_uid: Option<String>,
    /// Coerced amount; zero when missing or not a number
    pub amount: f64,
    /// Raw status string as stored
    pub raw_status: Option<String>,
    /// Whether `finalizedAt` is present and non-null
    pub finalized: bool,
}

impl InvestmentView {
    /// Read an investment document, coercing malformed fields to safe defaults
    pub fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        Self {
            id: doc.id.clone(),
            project_id: string_field(data, FIELD_PROJECT_ID),
            investor_uid: string_field(data, FIELD_INVESTOR_UID),
            amount: coerce_amount(data.get(FIELD_AMOUNT)),
            raw_status: string_field(data, FIELD_STATUS),
            finalized: matches!(data.get(FIELD_FINALIZED_AT), Some(v) if !v.is_null()),
        }
    }

    /// Canonicalize this investment's raw status
    pub fn canonical_status(&self) -> (InvestmentStatus, bool) {
        canonicalize(self.raw_status.as_deref(), self.finalized)
    }
}

/// An investment after status canonicalization, ready for aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalInvestment {
    /// Document id
    pub id: String,
    /// Investing user, when present
    pub investor_uid: Option<String>,
    /// Coerced amount
    pub amount: f64,
    /// Canonical status
    pub status: InvestmentStatus,
}

impl CanonicalInvestment {
    /// Pair a view with its canonical status
    pub fn new(view: &InvestmentView, status: InvestmentStatus) -> Self {
        Self {
            id: view.id.clone(),
            investor_uid: view.investor_uid.clone(),
            amount: view.amount,
            status,
        }
    }
}

/// Coerce a raw amount value to a finite number; anything else is zero
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

fn string_field(data: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    match data.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
