//! Fund Lifecycle Engine Library
//! # Overview
//!
//! This library implements a fund-state lifecycle engine for merchant
//! accounts: incoming funds are held pending for a policy-defined window,
//! cleared to available, and split into reserve and spendable buckets that
//! back real-time card authorization decisions.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (FundStateEntry, FundPolicy, snapshots, etc.)
//! - [`cli`] - CLI argument parsing for the event-replay harness
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The recalculation state machine
//!   - [`core::ledger`] - Fund state entry store with per-state aggregation
//!   - [`core::policy`] - Three-tier policy resolution and storage
//!   - [`core::snapshot`] - Cached per-account balance aggregates
//!   - [`core::authorization`] - Read-only card authorization gate
//! - [`service`] - External interface over the engine and stores
//! - [`scheduler`] - Periodic treasury sweep
//! - [`io`] - CSV event feed reader and snapshot report writer
//! - [`replay`] - The end-to-end replay pipeline behind the CLI
//!
//! # Fund States
//!
//! ```text
//! pending → available → { reserve, spendable }
//! ```
//!
//! Only `pending` and `available` are stored per-entry states. `reserve`
//! and `spendable` are aggregate buckets recomputed on every recalculation
//! by splitting the available total at the policy's reserve floor; they
//! never persist independently between recalculations.
//!
//! # Authorization
//!
//! The authorization gate reads one cached snapshot row per decision and
//! never recalculates, keeping its latency independent of ledger size.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod replay;
pub mod scheduler;
pub mod service;
pub mod types;

pub use crate::core::{
    AuthorizationDecision, AuthorizationGate, CardDirectory, LedgerStore, LifecycleEngine,
    PolicyStore, SnapshotCache,
};
pub use replay::run_replay;
pub use service::FundLifecycleService;
pub use types::{
    AccountId, AccountProfile, FundPolicy, FundState, FundStateEntry, FundStateSnapshot,
    FundStateSummary, LifecycleError, TransactionId,
};
