//! Fund-state lifecycle engine
//!
//! This module provides the LifecycleEngine that manages state transitions
//! for merchant funds:
//!
//! ```text
//! pending → available → { reserve, spendable }
//! ```
//!
//! Reserve and spendable are not per-entry states: they are a view over the
//! aggregate available total, recomputed fresh on every recalculation from
//! the resolved policy's reserve floor. The snapshot cache stores the last
//! output of that computation; nothing carries reserve/spendable forward
//! between cycles.
//!
//! The engine runs in two modes:
//! - Scheduled recalculation (periodic sweep, all treasury-enabled accounts)
//! - Targeted recalculation (event-driven, single account)

use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::core::ledger::LedgerStore;
use crate::core::policy::{resolve_policy, PolicyStore};
use crate::core::snapshot::SnapshotCache;
use crate::types::{
    AccountId, AccountProfile, AccountStatus, FundStateEntry, FundStateSnapshot, FundStateSummary,
    IssuingStatus, LifecycleError, TransactionId,
};

/// Split an available total into (reserve, spendable) buckets
///
/// `reserve = total * basis_points / 10_000` with truncating integer
/// division; `spendable` is the remainder, so the two always sum back to
/// the total with no rounding loss.
pub fn split_available(total_available: i64, basis_points: u32) -> (i64, i64) {
    // Widened intermediate: total * bps overflows i64 for totals above
    // i64::MAX / 10_000; the quotient always fits back in i64
    let reserve = (total_available as i128 * basis_points as i128 / 10_000) as i64;
    (reserve, total_available - reserve)
}

/// Core engine for fund state recalculation
///
/// Coordinates the policy store, ledger store, and snapshot cache. The
/// engine is the only writer of the ledger and the snapshot cache; the
/// authorization gate and status APIs read the cache only.
pub struct LifecycleEngine {
    ledger: Arc<LedgerStore>,
    snapshots: Arc<SnapshotCache>,
    policies: Arc<PolicyStore>,

    /// Per-account recalculation locks
    ///
    /// A recalculation reads ledger aggregates and then writes the
    /// snapshot; that sequence is not atomic, so concurrent recalculations
    /// for the same account are serialized here. Different accounts never
    /// contend, and the authorization path never takes these locks.
    recalc_locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl LifecycleEngine {
    /// Create an engine over shared stores
    pub fn new(
        ledger: Arc<LedgerStore>,
        snapshots: Arc<SnapshotCache>,
        policies: Arc<PolicyStore>,
    ) -> Self {
        LifecycleEngine {
            ledger,
            snapshots,
            policies,
            recalc_locks: DashMap::new(),
        }
    }

    /// Recalculate fund states for a single account
    ///
    /// 1. Resolve the effective policy
    /// 2. Check restrictions (restricted accounts skip transitions)
    /// 3. Transition eligible pending → available
    /// 4. Compute the available total from entries
    /// 5. Split it into reserve and spendable per the reserve floor
    /// 6. Persist the snapshot for fast reads
    ///
    /// When the resolved policy is disabled the engine performs no
    /// mutation and returns the existing snapshot values (or all zeros if
    /// none exists). Recalculation is idempotent: repeating it with no new
    /// entries produces an identical snapshot.
    ///
    /// The caller is responsible for having resolved the account; an
    /// unknown account id is surfaced as `AccountNotFound` by the service
    /// layer before the engine is invoked.
    pub fn recalculate(
        &self,
        account: &AccountProfile,
        reason: &str,
    ) -> Result<FundStateSummary, LifecycleError> {
        let policy = resolve_policy(self.policies.get_for_account(account.id).as_ref());

        if !policy.enabled {
            // Engine is off for this account; report current state untouched
            return Ok(match self.snapshots.get(account.id) {
                Some(snapshot) => FundStateSummary::from_snapshot(&snapshot),
                None => FundStateSummary::zero(),
            });
        }

        let lock = self
            .recalc_locks
            .entry(account.id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Recalculation is convergent; a poisoned lock is safe to reuse
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let now = Utc::now();
        let is_restricted = Self::is_account_restricted(account);

        let transitioned = if is_restricted {
            0
        } else {
            self.ledger
                .transition_pending_to_available(account.id, now, reason, now)
        };

        let totals = self.ledger.sum_all_states(account.id);
        let total_available = totals.available;
        let (reserve_amount, spendable_amount) =
            split_available(total_available, policy.reserve_floor_basis_points);

        self.snapshots.upsert(FundStateSnapshot {
            account_id: account.id,
            pending_amount: totals.pending,
            available_amount: total_available,
            reserve_amount,
            spendable_amount,
            last_recalculated_at: now,
            policy_config: policy.to_config(),
        });

        info!(
            account_id = account.id,
            reason,
            pending = totals.pending,
            available = total_available,
            reserve = reserve_amount,
            spendable = spendable_amount,
            transitioned,
            restricted = is_restricted,
            "fund_lifecycle.recalculated"
        );

        Ok(FundStateSummary {
            pending_amount: totals.pending,
            available_amount: total_available,
            reserve_amount,
            spendable_amount,
            total_amount: totals.pending + total_available + reserve_amount + spendable_amount,
        })
    }

    /// Create a new fund state entry in pending state
    ///
    /// Called when a payment is received and cleared by the merchant of
    /// record. The pending window comes from the resolved policy unless
    /// explicitly overridden.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::DuplicateTransaction` if a non-deleted
    /// entry already exists for the same `(account, transaction)` pair.
    pub fn create_pending_entry(
        &self,
        account_id: AccountId,
        amount: i64,
        currency: &str,
        transaction_id: Option<TransactionId>,
        pending_window_days: Option<u32>,
    ) -> Result<FundStateEntry, LifecycleError> {
        let window = match pending_window_days {
            Some(days) => days,
            None => {
                resolve_policy(self.policies.get_for_account(account_id).as_ref())
                    .pending_window_days
            }
        };

        let now = Utc::now();
        let entry = self
            .ledger
            .create_pending_entry(account_id, amount, currency, transaction_id, window, now)?;

        info!(
            account_id,
            amount,
            pending_until = %entry.pending_until.unwrap_or(now),
            "fund_lifecycle.entry_created"
        );
        Ok(entry)
    }

    /// Claw back funds (e.g., refund or dispute)
    ///
    /// Creates a negative-amount pending entry with `pending_until = now`
    /// so the very next recalculation absorbs it into the balances.
    pub fn clawback(&self, account_id: AccountId, amount: i64, reason: &str) -> FundStateEntry {
        let entry = self.ledger.clawback(account_id, amount, reason, Utc::now());
        info!(account_id, amount, reason, "fund_lifecycle.clawback");
        entry
    }

    /// Whether the account is in a state that freezes pending transitions
    pub fn is_account_restricted(account: &AccountProfile) -> bool {
        matches!(
            account.status,
            AccountStatus::UnderReview | AccountStatus::Denied
        ) || account.issuing_status == IssuingStatus::TemporarilyRestricted
    }
}
