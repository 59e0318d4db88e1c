//! Core data types for the Fund Lifecycle Engine
//!
//! This module defines the types used throughout the system:
//! - `entry` - Fund states and ledger entries
//! - `policy` - Policy rows, partial updates, and resolved policies
//! - `snapshot` - Cached aggregates and status views
//! - `account` - External account profile (referenced, not owned)
//! - `error` - Error types

pub mod account;
pub mod entry;
pub mod error;
pub mod policy;
pub mod snapshot;

pub use account::{AccountMode, AccountProfile, AccountStatus, IssuingStatus};
pub use entry::{AccountId, EntryId, FundState, FundStateEntry, TransactionId};
pub use error::LifecycleError;
pub use policy::{FundPolicy, FundPolicyUpdate, ResolvedPolicy};
pub use snapshot::{FundStateSnapshot, FundStateStatus, FundStateSummary};
