//! Fund-state entry types for the Fund Lifecycle Engine
//!
//! This module defines the per-entry lifecycle state enum and the ledger
//! entry structure that tracks discrete fund amounts through the
//! pending → available lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Supports account IDs from 0 to 2^64-1
pub type AccountId = u64;

/// Transaction identifier (from the payment processing subsystem)
///
/// Optional on ledger entries; clawbacks carry no transaction reference.
pub type TransactionId = u64;

/// Ledger entry identifier, assigned by the ledger store on insertion
pub type EntryId = u64;

/// Lifecycle states for merchant funds
///
/// Only `Pending` and `Available` are true per-entry states. `Reserve` and
/// `Spendable` are bucket names for aggregates derived from the available
/// total at recalculation time; no individual entry ever occupies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundState {
    /// Funds received but still inside the policy's pending window
    ///
    /// Entries are created in this state and remain here until the
    /// lifecycle engine transitions them (or the account is restricted).
    Pending,

    /// Funds cleared by the pending window, not yet categorized
    ///
    /// The recalculation step splits the aggregate available total into
    /// reserve and spendable buckets; the entries themselves stay here.
    Available,

    /// Aggregate bucket: risk buffer held back per the reserve floor policy
    Reserve,

    /// Aggregate bucket: funds the authorization gate will approve spend against
    Spendable,
}

impl FundState {
    /// All four states, in lifecycle order
    pub const ALL: [FundState; 4] = [
        FundState::Pending,
        FundState::Available,
        FundState::Reserve,
        FundState::Spendable,
    ];

    /// Lowercase string form used in transition records and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FundState::Pending => "pending",
            FundState::Available => "available",
            FundState::Reserve => "reserve",
            FundState::Spendable => "spendable",
        }
    }
}

/// A discrete amount of money in one lifecycle state for one account
///
/// Entries are created by "record payment received" (state = pending,
/// `pending_until` = now + policy window) or "record clawback" (negative
/// amount, `pending_until` = now). They are mutated only by the engine's
/// transition step and are never hard-deleted; the `deleted` flag excludes
/// an entry from aggregate sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStateEntry {
    /// Ledger-assigned entry identifier
    pub id: EntryId,

    /// The account this entry belongs to
    pub account_id: AccountId,

    /// Originating transaction, when the entry came from a payment
    pub transaction_id: Option<TransactionId>,

    /// Current lifecycle state (Pending or Available for stored entries)
    pub state: FundState,

    /// Signed amount in minor currency units (e.g. cents)
    ///
    /// Negative amounts are used by clawbacks/refunds to offset prior
    /// credits once they are absorbed into the available total.
    pub amount: i64,

    /// ISO 4217 currency code, lowercase
    pub currency: String,

    /// When the pending window expires; only meaningful while state = Pending
    pub pending_until: Option<DateTime<Utc>>,

    /// When the state last changed
    pub transitioned_at: Option<DateTime<Utc>>,

    /// State before the last transition
    pub previous_state: Option<FundState>,

    /// Free-text tag describing why the last transition happened
    pub transition_reason: Option<String>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// Soft-deletion flag; excluded from aggregate sums when set
    pub deleted: bool,
}
