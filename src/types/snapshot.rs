//! Snapshot and summary types
//!
//! The snapshot is the single cached aggregate row per account, written by
//! the lifecycle engine on every recalculation and read by the low-latency
//! authorization path. It is never computed on demand during authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::account::IssuingStatus;
use super::entry::AccountId;

/// Cached aggregate of fund state amounts for one account
///
/// Exactly one snapshot exists per account (upsert semantics). The four
/// amount fields are in minor currency units; `total_amount` is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStateSnapshot {
    pub account_id: AccountId,
    pub pending_amount: i64,
    pub available_amount: i64,
    pub reserve_amount: i64,
    pub spendable_amount: i64,

    /// When the lifecycle engine last wrote this row
    pub last_recalculated_at: DateTime<Utc>,

    /// The resolved policy used to compute this snapshot, serialized
    pub policy_config: Value,
}

impl FundStateSnapshot {
    /// Derived sum of the four amount fields
    pub fn total_amount(&self) -> i64 {
        self.pending_amount + self.available_amount + self.reserve_amount + self.spendable_amount
    }
}

/// Aggregated fund state breakdown returned by recalculation and status reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundStateSummary {
    /// Amount in minor units pending clearance
    pub pending_amount: i64,
    /// Amount in minor units cleared by policy
    pub available_amount: i64,
    /// Amount in minor units held back for risk coverage
    pub reserve_amount: i64,
    /// Amount in minor units the authorization gate will approve spend against
    pub spendable_amount: i64,
    /// Total across all states
    pub total_amount: i64,
}

impl FundStateSummary {
    /// All-zero summary, used when no snapshot exists for an account
    pub fn zero() -> Self {
        FundStateSummary {
            pending_amount: 0,
            available_amount: 0,
            reserve_amount: 0,
            spendable_amount: 0,
            total_amount: 0,
        }
    }

    /// Build a summary from a cached snapshot
    pub fn from_snapshot(snapshot: &FundStateSnapshot) -> Self {
        FundStateSummary {
            pending_amount: snapshot.pending_amount,
            available_amount: snapshot.available_amount,
            reserve_amount: snapshot.reserve_amount,
            spendable_amount: snapshot.spendable_amount,
            total_amount: snapshot.total_amount(),
        }
    }
}

/// Full fund lifecycle status for an account, as exposed to callers
///
/// The explanations are human-readable strings synthesized from the
/// snapshot's `policy_config` (pending window days, reserve basis points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStateStatus {
    pub summary: FundStateSummary,
    pub issuing_status: IssuingStatus,

    /// Active restriction reasons, if any
    pub restrictions: Vec<String>,

    /// Human-readable explanation of pending funds
    pub pending_explanation: Option<String>,

    /// Human-readable explanation of the reserve hold
    pub reserve_explanation: Option<String>,

    /// When the fund states were last recalculated
    pub last_recalculated_at: Option<DateTime<Utc>>,
}
