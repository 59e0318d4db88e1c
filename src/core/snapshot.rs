//! Snapshot cache
//!
//! One cached aggregate row per account, written by the lifecycle engine on
//! each recalculation and read by the authorization fast path and status
//! APIs. The cache is the only structure the authorization gate consults;
//! balances are never computed on demand there.

use dashmap::DashMap;

use crate::types::{AccountId, FundStateSnapshot};

/// Concurrent cache of fund state snapshots, at most one per account
///
/// Reads are lock-free snapshots of the row; the upsert replaces the whole
/// row, so readers never observe a partially-written aggregate.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: DashMap<AccountId, FundStateSnapshot>,
}

impl SnapshotCache {
    /// Create an empty snapshot cache
    pub fn new() -> Self {
        SnapshotCache {
            snapshots: DashMap::new(),
        }
    }

    /// Read the cached snapshot for an account
    ///
    /// Returns a clone; the authorization gate treats `None` as
    /// deny-by-default (funds not yet cleared).
    pub fn get(&self, account_id: AccountId) -> Option<FundStateSnapshot> {
        self.snapshots.get(&account_id).map(|s| s.clone())
    }

    /// Insert or replace the snapshot for an account
    pub fn upsert(&self, snapshot: FundStateSnapshot) {
        self.snapshots.insert(snapshot.account_id, snapshot);
    }

    /// Clone out every cached snapshot (report generation)
    pub fn all(&self) -> Vec<FundStateSnapshot> {
        self.snapshots.iter().map(|s| s.clone()).collect()
    }

    /// Number of cached snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn snapshot(account_id: AccountId, spendable: i64) -> FundStateSnapshot {
        FundStateSnapshot {
            account_id,
            pending_amount: 0,
            available_amount: spendable,
            reserve_amount: 0,
            spendable_amount: spendable,
            last_recalculated_at: Utc::now(),
            policy_config: json!({}),
        }
    }

    #[test]
    fn test_get_returns_none_without_snapshot() {
        let cache = SnapshotCache::new();
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_upsert_then_get() {
        let cache = SnapshotCache::new();
        cache.upsert(snapshot(1, 45_000));

        let cached = cache.get(1).unwrap();
        assert_eq!(cached.spendable_amount, 45_000);
    }

    #[test]
    fn test_upsert_keeps_one_row_per_account() {
        let cache = SnapshotCache::new();
        cache.upsert(snapshot(1, 45_000));
        cache.upsert(snapshot(1, 36_000));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1).unwrap().spendable_amount, 36_000);
    }

    #[test]
    fn test_accounts_are_isolated() {
        let cache = SnapshotCache::new();
        cache.upsert(snapshot(1, 100));
        cache.upsert(snapshot(2, 200));

        assert_eq!(cache.get(1).unwrap().spendable_amount, 100);
        assert_eq!(cache.get(2).unwrap().spendable_amount, 200);
    }
}
