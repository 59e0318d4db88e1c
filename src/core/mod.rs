//! Core fund lifecycle logic
//!
//! - [`ledger`]: append/update store of per-account fund state entries
//! - [`policy`]: three-tier policy resolution and storage
//! - [`snapshot`]: cached aggregate balances, one row per account
//! - [`engine`]: the recalculation state machine
//! - [`authorization`]: the read-only card authorization gate
//! - [`traits`]: seams to external subsystems (account directory)

pub mod authorization;
pub mod engine;
pub mod ledger;
pub mod policy;
pub mod snapshot;
pub mod traits;

pub use authorization::{
    AuthorizationDecision, AuthorizationGate, CardDirectory, CardStatus, Cardholder,
    CardholderStatus, IssuedCard,
};
pub use engine::{split_available, LifecycleEngine};
pub use ledger::{LedgerStore, Pagination, StateTotals};
pub use policy::{resolve_policy, PolicyStore};
pub use snapshot::SnapshotCache;
pub use traits::{AccountDirectory, InMemoryAccountDirectory};
