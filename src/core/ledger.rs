//! Ledger store for fund state entries
//!
//! An append-mostly store of discrete fund amounts per account. Creation
//! and clawback append; the pending → available transition mutates rows in
//! place, recording the previous state and a reason tag. Entries are never
//! hard-deleted; a soft-deletion flag excludes them from aggregates.
//!
//! # Idempotency
//!
//! Entry creation has no general deduplication; callers guarantee
//! at-most-once invocation. As a safety net against webhook replay, a
//! second non-deleted entry for the same `(account, transaction)` pair is
//! rejected.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{AccountId, EntryId, FundState, FundStateEntry, LifecycleError, TransactionId};

/// Per-state sums for one account, in minor currency units
///
/// States with no entries sum to zero. Only pending and available carry
/// stored entries; the reserve and spendable fields exist so the mapping
/// covers all four states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateTotals {
    pub pending: i64,
    pub available: i64,
    pub reserve: i64,
    pub spendable: i64,
}

impl StateTotals {
    /// Sum for a single state
    pub fn get(&self, state: FundState) -> i64 {
        match state {
            FundState::Pending => self.pending,
            FundState::Available => self.available,
            FundState::Reserve => self.reserve,
            FundState::Spendable => self.spendable,
        }
    }
}

/// Pagination window for entry listings (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, limit: 50 }
    }
}

/// Concurrent store of fund state entries, keyed by account
///
/// DashMap shards give lock-free access across accounts; operations on a
/// single account's entry vector are serialized by the shard lock.
#[derive(Debug, Default)]
pub struct LedgerStore {
    entries: DashMap<AccountId, Vec<FundStateEntry>>,
    next_id: AtomicU64,
}

impl LedgerStore {
    /// Create an empty ledger store
    pub fn new() -> Self {
        LedgerStore {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Insert a fully-formed entry, assigning it a fresh id
    ///
    /// Used by the creation operations below and by test fixtures that
    /// need backdated timestamps. Returns the stored entry.
    pub fn insert(&self, mut entry: FundStateEntry) -> FundStateEntry {
        entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .entry(entry.account_id)
            .or_default()
            .push(entry.clone());
        entry
    }

    /// Create a new entry in pending state
    ///
    /// `pending_until` is set to `now + pending_window_days`. The caller
    /// resolves the window from policy when it is not explicitly given.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::DuplicateTransaction` if a non-deleted
    /// entry already exists for the same `(account_id, transaction_id)`.
    pub fn create_pending_entry(
        &self,
        account_id: AccountId,
        amount: i64,
        currency: &str,
        transaction_id: Option<TransactionId>,
        pending_window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<FundStateEntry, LifecycleError> {
        // The duplicate scan and the push happen under one shard write
        // guard, so racing calls with the same transaction id cannot both
        // pass the check
        let mut entries = self.entries.entry(account_id).or_default();
        if let Some(tx) = transaction_id {
            if entries
                .iter()
                .any(|e| !e.deleted && e.transaction_id == Some(tx))
            {
                return Err(LifecycleError::duplicate_transaction(tx, account_id));
            }
        }

        let entry = FundStateEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            account_id,
            transaction_id,
            state: FundState::Pending,
            amount,
            currency: currency.to_string(),
            pending_until: Some(now + Duration::days(pending_window_days as i64)),
            transitioned_at: Some(now),
            previous_state: None,
            transition_reason: Some("payment_received".to_string()),
            created_at: now,
            deleted: false,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    /// Record a clawback (refund or dispute) against an account
    ///
    /// Inserts a negative-amount pending entry with `pending_until = now`,
    /// making it eligible for absorption by the very next recalculation.
    pub fn clawback(
        &self,
        account_id: AccountId,
        amount: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> FundStateEntry {
        let entry = FundStateEntry {
            id: 0,
            account_id,
            transaction_id: None,
            state: FundState::Pending,
            amount: -amount,
            currency: "usd".to_string(),
            pending_until: Some(now),
            transitioned_at: Some(now),
            previous_state: None,
            transition_reason: Some(format!("clawback:{}", reason)),
            created_at: now,
            deleted: false,
        };
        self.insert(entry)
    }

    /// Sum non-deleted entry amounts per state for one account
    pub fn sum_all_states(&self, account_id: AccountId) -> StateTotals {
        let mut totals = StateTotals::default();
        if let Some(entries) = self.entries.get(&account_id) {
            for entry in entries.iter().filter(|e| !e.deleted) {
                match entry.state {
                    FundState::Pending => totals.pending += entry.amount,
                    FundState::Available => totals.available += entry.amount,
                    FundState::Reserve => totals.reserve += entry.amount,
                    FundState::Spendable => totals.spendable += entry.amount,
                }
            }
        }
        totals
    }

    /// Non-deleted pending entries whose window has expired at `cutoff`
    pub fn get_pending_before(
        &self,
        account_id: AccountId,
        cutoff: DateTime<Utc>,
    ) -> Vec<FundStateEntry> {
        match self.entries.get(&account_id) {
            Some(entries) => entries
                .iter()
                .filter(|e| {
                    !e.deleted
                        && e.state == FundState::Pending
                        && e.pending_until.is_some_and(|until| until <= cutoff)
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Transition expired pending entries to available, in place
    ///
    /// For each matched entry: `previous_state` takes the old state,
    /// `state` becomes available, `transitioned_at` is stamped, and the
    /// reason is tagged `pending_window_cleared:<reason>`.
    ///
    /// Returns the number of entries transitioned.
    pub fn transition_pending_to_available(
        &self,
        account_id: AccountId,
        cutoff: DateTime<Utc>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> usize {
        let mut count = 0;
        if let Some(mut entries) = self.entries.get_mut(&account_id) {
            for entry in entries.iter_mut() {
                let eligible = !entry.deleted
                    && entry.state == FundState::Pending
                    && entry.pending_until.is_some_and(|until| until <= cutoff);
                if eligible {
                    entry.previous_state = Some(entry.state);
                    entry.state = FundState::Available;
                    entry.transitioned_at = Some(now);
                    entry.transition_reason = Some(format!("pending_window_cleared:{}", reason));
                    count += 1;
                }
            }
        }
        count
    }

    /// List non-deleted entries for an account, newest first
    ///
    /// Returns the requested page and the total count matching the filter.
    pub fn list_entries(
        &self,
        account_id: AccountId,
        state: Option<FundState>,
        pagination: Pagination,
    ) -> (Vec<FundStateEntry>, usize) {
        let mut matching: Vec<FundStateEntry> = match self.entries.get(&account_id) {
            Some(entries) => entries
                .iter()
                .filter(|e| !e.deleted && state.is_none_or(|s| e.state == s))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len();
        let page = pagination.page.max(1);
        let start = (page - 1).saturating_mul(pagination.limit).min(total);
        let end = start.saturating_add(pagination.limit).min(total);
        (matching[start..end].to_vec(), total)
    }

    /// Soft-delete an entry, excluding it from aggregates and listings
    ///
    /// Returns false if the entry does not exist.
    pub fn mark_deleted(&self, account_id: AccountId, entry_id: EntryId) -> bool {
        if let Some(mut entries) = self.entries.get_mut(&account_id) {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
                entry.deleted = true;
                return true;
            }
        }
        false
    }
}
