//! CSV record types for the replay harness
//!
//! Events feed the service triggers; account rows seed the directory;
//! snapshot rows are the report output. Field names match the CSV headers
//! via serde.

use serde::{Deserialize, Serialize};

use crate::types::{
    AccountId, AccountMode, AccountProfile, AccountStatus, IssuingStatus, TransactionId,
};

/// Kind of fund event carried by one CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PaymentReceived,
    Clawback,
    Recalculate,
}

/// One row of the event feed
///
/// `amount` is in minor currency units. `transaction_id` and `reason` are
/// meaningful only for the event types that use them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRecord {
    pub event: EventType,
    pub account_id: AccountId,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// One row of the optional accounts seed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub status: AccountStatus,
    pub issuing_status: IssuingStatus,
    #[serde(default = "default_true")]
    pub treasury_enabled: bool,
}

impl AccountRecord {
    /// Build the directory profile for this row
    ///
    /// Seeded accounts are always Custom mode; Standard accounts never
    /// reach the lifecycle engine.
    pub fn to_profile(self) -> AccountProfile {
        AccountProfile {
            id: self.account_id,
            status: self.status,
            issuing_status: self.issuing_status,
            account_mode: AccountMode::Custom,
            treasury_enabled: self.treasury_enabled,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One row of the snapshot report output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    pub account_id: AccountId,
    pub pending: i64,
    pub available: i64,
    pub reserve: i64,
    pub spendable: i64,
    pub total: i64,
}
