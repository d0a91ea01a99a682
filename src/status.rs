// Copyright 2025 Cowboy AI, LLC.

//! Canonical investment statuses and the canonicalization function
//!
//! Investment documents carry their status as a raw string written by a
//! loosely-typed external workflow. Before aggregation every raw value is
//! mapped to a closed enumeration: the eight canonical statuses plus an
//! explicit `Unresolvable` sentinel for values the engine refuses to guess
//! about. Unresolvable investments contribute to neither funding total.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical status of an investment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    /// Created by the external workflow, not yet under contract
    Pending,
    /// Contract is being prepared
    PendingContract,
    /// Contract sent, awaiting signature
    Signing,
    /// Contract signed, funds committed
    Signed,
    /// Investment is live
    Active,
    /// Investment ran to term
    Completed,
    /// Rejected by the back office
    Rejected,
    /// Cancelled by the investor or the back office
    Cancelled,
    /// Raw value was not recognized; excluded from all aggregates and never
    /// written back
    Unresolvable,
}

impl InvestmentStatus {
    /// Wire name of this status as stored on investment documents
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Pending => "pending",
            InvestmentStatus::PendingContract => "pending_contract",
            InvestmentStatus::Signing => "signing",
            InvestmentStatus::Signed => "signed",
            InvestmentStatus::Active => "active",
            InvestmentStatus::Completed => "completed",
            InvestmentStatus::Rejected => "rejected",
            InvestmentStatus::Cancelled => "cancelled",
            InvestmentStatus::Unresolvable => "unresolvable",
        }
    }

    /// Whether this status counts toward `currentAmount` and `investorsCount`
    pub fn is_counted(&self) -> bool {
        matches!(
            self,
            InvestmentStatus::Signed | InvestmentStatus::Active | InvestmentStatus::Completed
        )
    }

    /// Whether this status counts toward `pendingAmount`
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            InvestmentStatus::Pending
                | InvestmentStatus::PendingContract
                | InvestmentStatus::Signing
        )
    }

    /// Parse an already-canonical wire name
    fn from_canonical(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(InvestmentStatus::Pending),
            "pending_contract" => Some(InvestmentStatus::PendingContract),
            "signing" => Some(InvestmentStatus::Signing),
            "signed" => Some(InvestmentStatus::Signed),
            "active" => Some(InvestmentStatus::Active),
            "completed" => Some(InvestmentStatus::Completed),
            "rejected" => Some(InvestmentStatus::Rejected),
            "cancelled" => Some(InvestmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a raw status string to its canonical form.
///
/// Returns the canonical status and whether the raw value was a legacy value
/// that should be rewritten on the document. Matching is case-insensitive and
/// ignores surrounding whitespace. Two legacy values are recognized:
///
/// - `approved` becomes `active` when the investment has a `finalizedAt`
///   timestamp, `signed` otherwise
/// - `pending_review` becomes `pending`
///
/// Anything else that is not already canonical maps to
/// [`InvestmentStatus::Unresolvable`] with no rewrite: the engine never
/// guesses at unknown values.
pub fn canonicalize(raw: Option<&str>, finalized: bool) -> (InvestmentStatus, bool) {
    let Some(raw) = raw else {
        return (InvestmentStatus::Unresolvable, false);
    };

    let normalized = raw.trim().to_ascii_lowercase();

    if let Some(status) = InvestmentStatus::from_canonical(&normalized) {
        return (status, false);
    }

    match normalized.as_str() {
        "approved" => {
            if finalized {
                (InvestmentStatus::Active, true)
            } else {
                (InvestmentStatus::Signed, true)
            }
        }
        "pending_review" => (InvestmentStatus::Pending, true),
        _ => (InvestmentStatus::Unresolvable, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("pending", InvestmentStatus::Pending)]
    #[test_case("pending_contract", InvestmentStatus::PendingContract)]
    #[test_case("signing", InvestmentStatus::Signing)]
    #[test_case("signed", InvestmentStatus::Signed)]
    #[test_case("active", InvestmentStatus::Active)]
    #[test_case("completed", InvestmentStatus::Completed)]
    #[test_case("rejected", InvestmentStatus::Rejected)]
    #[test_case("cancelled", InvestmentStatus::Cancelled)]
    fn test_canonical_values_pass_through(raw: &str, expected: InvestmentStatus) {
        let (status, rewritten) = canonicalize(Some(raw), false);
        assert_eq!(status, expected);
        assert!(!rewritten);
    }

    #[test_case("  signed  ", InvestmentStatus::Signed)]
    #[test_case("ACTIVE", InvestmentStatus::Active)]
    #[test_case("Pending_Contract", InvestmentStatus::PendingContract)]
    fn test_matching_is_lenient(raw: &str, expected: InvestmentStatus) {
        let (status, rewritten) = canonicalize(Some(raw), false);
        assert_eq!(status, expected);
        assert!(!rewritten);
    }

    #[test]
    fn test_approved_maps_on_finalized_at() {
        let (status, rewritten) = canonicalize(Some("approved"), true);
        assert_eq!(status, InvestmentStatus::Active);
        assert!(rewritten);

        let (status, rewritten) = canonicalize(Some("approved"), false);
        assert_eq!(status, InvestmentStatus::Signed);
        assert!(rewritten);
    }

    #[test]
    fn test_pending_review_maps_to_pending() {
        let (status, rewritten) = canonicalize(Some("pending_review"), false);
        assert_eq!(status, InvestmentStatus::Pending);
        assert!(rewritten);

        // finalizedAt does not disambiguate this one
        let (status, rewritten) = canonicalize(Some("PENDING_REVIEW"), true);
        assert_eq!(status, InvestmentStatus::Pending);
        assert!(rewritten);
    }

    #[test_case("in_escrow"; "in_escrow")]
    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace")]
    #[test_case("approved!"; "approved_bang")]
    fn test_unrecognized_values_are_unresolvable(raw: &str) {
        let (status, rewritten) = canonicalize(Some(raw), true);
        assert_eq!(status, InvestmentStatus::Unresolvable);
        assert!(!rewritten);
    }

    #[test]
    fn test_missing_status_is_unresolvable() {
        let (status, rewritten) = canonicalize(None, false);
        assert_eq!(status, InvestmentStatus::Unresolvable);
        assert!(!rewritten);
    }

    #[test]
    fn test_counted_and_pending_sets_are_disjoint() {
        let all = [
            InvestmentStatus::Pending,
            InvestmentStatus::PendingContract,
            InvestmentStatus::Signing,
            InvestmentStatus::Signed,
            InvestmentStatus::Active,
            InvestmentStatus::Completed,
            InvestmentStatus::Rejected,
            InvestmentStatus::Cancelled,
            InvestmentStatus::Unresolvable,
        ];

        for status in all {
            assert!(
                !(status.is_counted() && status.is_pending()),
                "{status} is in both sets"
            );
        }

        let counted: Vec<_> = all.iter().filter(|s| s.is_counted()).collect();
        let pending: Vec<_> = all.iter().filter(|s| s.is_pending()).collect();
        assert_eq!(counted.len(), 3);
        assert_eq!(pending.len(), 3);

        // rejected, cancelled, unresolvable feed neither total
        assert!(!InvestmentStatus::Rejected.is_counted());
        assert!(!InvestmentStatus::Rejected.is_pending());
        assert!(!InvestmentStatus::Cancelled.is_counted());
        assert!(!InvestmentStatus::Cancelled.is_pending());
        assert!(!InvestmentStatus::Unresolvable.is_counted());
        assert!(!InvestmentStatus::Unresolvable.is_pending());
    }

    #[test]
    fn test_serde_wire_names_match_as_str() {
        let status = InvestmentStatus::PendingContract;
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json, serde_json::json!("pending_contract"));
        assert_eq!(json, serde_json::json!(status.as_str()));
    }

    #[test]
    fn test_canonicalize_is_pure() {
        // Same input, same output, regardless of how often it runs
        for _ in 0..3 {
            assert_eq!(
                canonicalize(Some("approved"), false),
                (InvestmentStatus::Signed, true)
            );
        }
    }
}
