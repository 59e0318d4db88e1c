//! Policy resolution and storage
//!
//! Resolution follows a strict three-tier fallback:
//!
//! 1. Account-specific policy row (wins outright, never merged)
//! 2. Global default row (`account_id = None`)
//! 3. Hardcoded fallback constants (enabled=false, 7 days, 1000 bps)
//!
//! `resolve_policy` is a pure function over an optional row; the store
//! handles which row that is.

use dashmap::DashMap;
use std::sync::RwLock;

use crate::types::policy::{
    DEFAULT_ENABLED, DEFAULT_PENDING_WINDOW_DAYS, DEFAULT_RESERVE_FLOOR_BASIS_POINTS,
};
use crate::types::{AccountId, FundPolicy, FundPolicyUpdate, LifecycleError, ResolvedPolicy};

/// Resolve a policy row (or its absence) into concrete parameters
///
/// No error conditions; this is a pure function over optional input.
/// An account-specific row fully determines all three fields even if it
/// was created from a partial update.
pub fn resolve_policy(policy: Option<&FundPolicy>) -> ResolvedPolicy {
    match policy {
        Some(p) => ResolvedPolicy {
            enabled: p.enabled,
            pending_window_days: p.pending_window_days,
            reserve_floor_basis_points: p.reserve_floor_basis_points,
        },
        None => ResolvedPolicy::fallback(),
    }
}

/// Store of policy rows: at most one per account, at most one global default
///
/// Reads are lock-free on the per-account side (DashMap); the single global
/// row sits behind an RwLock. The store validates updates before applying
/// them, so rows it holds are always in range.
#[derive(Debug, Default)]
pub struct PolicyStore {
    account_policies: DashMap<AccountId, FundPolicy>,
    global_default: RwLock<Option<FundPolicy>>,
}

impl PolicyStore {
    /// Create an empty policy store
    pub fn new() -> Self {
        PolicyStore {
            account_policies: DashMap::new(),
            global_default: RwLock::new(None),
        }
    }

    /// Get the row that governs an account: its own row, else the global
    /// default, else `None` (caller falls back to hardcoded constants)
    pub fn get_for_account(&self, account_id: AccountId) -> Option<FundPolicy> {
        if let Some(policy) = self.account_policies.get(&account_id) {
            return Some(policy.clone());
        }
        self.get_global_default()
    }

    /// Get the account-specific row only (no fallback to the global default)
    pub fn get_account_override(&self, account_id: AccountId) -> Option<FundPolicy> {
        self.account_policies.get(&account_id).map(|p| p.clone())
    }

    /// Get the global default row, if one has been configured
    pub fn get_global_default(&self) -> Option<FundPolicy> {
        // Convergent data; a poisoned lock still holds a usable value
        self.global_default
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Create or update a policy row
    ///
    /// `account_id = None` targets the global default row. On an existing
    /// row only the set fields of `update` are applied; on creation unset
    /// fields take the hardcoded defaults, so a stored row is always fully
    /// determined.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidPolicyValue` if a set field is out
    /// of range (days 0-90, basis points 0-10000).
    pub fn upsert(
        &self,
        account_id: Option<AccountId>,
        update: &FundPolicyUpdate,
    ) -> Result<FundPolicy, LifecycleError> {
        update.validate()?;

        match account_id {
            Some(id) => {
                let mut entry = self
                    .account_policies
                    .entry(id)
                    .or_insert_with(|| Self::new_row(Some(id)));
                Self::apply(entry.value_mut(), update);
                Ok(entry.clone())
            }
            None => {
                let mut guard = self
                    .global_default
                    .write()
                    .unwrap_or_else(|e| e.into_inner());
                let row = guard.get_or_insert_with(|| Self::new_row(None));
                Self::apply(row, update);
                Ok(row.clone())
            }
        }
    }

    fn new_row(account_id: Option<AccountId>) -> FundPolicy {
        FundPolicy {
            account_id,
            enabled: DEFAULT_ENABLED,
            pending_window_days: DEFAULT_PENDING_WINDOW_DAYS,
            reserve_floor_basis_points: DEFAULT_RESERVE_FLOOR_BASIS_POINTS,
        }
    }

    fn apply(row: &mut FundPolicy, update: &FundPolicyUpdate) {
        if let Some(enabled) = update.enabled {
            row.enabled = enabled;
        }
        if let Some(days) = update.pending_window_days {
            row.pending_window_days = days;
        }
        if let Some(bps) = update.reserve_floor_basis_points {
            row.reserve_floor_basis_points = bps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_update(days: u32, bps: u32) -> FundPolicyUpdate {
        FundPolicyUpdate {
            enabled: Some(true),
            pending_window_days: Some(days),
            reserve_floor_basis_points: Some(bps),
        }
    }

    #[test]
    fn test_resolve_none_uses_hardcoded_fallback() {
        let resolved = resolve_policy(None);
        assert!(!resolved.enabled);
        assert_eq!(resolved.pending_window_days, 7);
        assert_eq!(resolved.reserve_floor_basis_points, 1000);
    }

    #[test]
    fn test_resolve_row_takes_all_fields_from_row() {
        let row = FundPolicy {
            account_id: Some(1),
            enabled: true,
            pending_window_days: 3,
            reserve_floor_basis_points: 2000,
        };
        let resolved = resolve_policy(Some(&row));
        assert!(resolved.enabled);
        assert_eq!(resolved.pending_window_days, 3);
        assert_eq!(resolved.reserve_floor_basis_points, 2000);
    }

    #[test]
    fn test_account_override_wins_over_global_default() {
        let store = PolicyStore::new();
        store.upsert(None, &enabled_update(7, 1000)).unwrap();
        store.upsert(Some(1), &enabled_update(2, 500)).unwrap();

        let resolved = resolve_policy(store.get_for_account(1).as_ref());
        assert_eq!(resolved.pending_window_days, 2);
        assert_eq!(resolved.reserve_floor_basis_points, 500);
    }

    #[test]
    fn test_account_override_is_not_merged_with_global() {
        let store = PolicyStore::new();
        store.upsert(None, &enabled_update(14, 3000)).unwrap();

        // Account row sets only the enabled flag; the unset fields take the
        // hardcoded defaults, never the global row's values
        store
            .upsert(
                Some(1),
                &FundPolicyUpdate {
                    enabled: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        let resolved = resolve_policy(store.get_for_account(1).as_ref());
        assert!(resolved.enabled);
        assert_eq!(resolved.pending_window_days, 7);
        assert_eq!(resolved.reserve_floor_basis_points, 1000);
    }

    #[test]
    fn test_fallback_to_global_when_no_account_row() {
        let store = PolicyStore::new();
        store.upsert(None, &enabled_update(10, 1500)).unwrap();

        let resolved = resolve_policy(store.get_for_account(99).as_ref());
        assert!(resolved.enabled);
        assert_eq!(resolved.pending_window_days, 10);
        assert_eq!(resolved.reserve_floor_basis_points, 1500);
    }

    #[test]
    fn test_no_rows_resolves_to_fallback() {
        let store = PolicyStore::new();
        assert!(store.get_for_account(1).is_none());

        let resolved = resolve_policy(store.get_for_account(1).as_ref());
        assert_eq!(resolved, ResolvedPolicy::fallback());
    }

    #[test]
    fn test_upsert_updates_existing_row_in_place() {
        let store = PolicyStore::new();
        store.upsert(Some(1), &enabled_update(5, 800)).unwrap();

        // Partial update touches only the window
        store
            .upsert(
                Some(1),
                &FundPolicyUpdate {
                    pending_window_days: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();

        let row = store.get_account_override(1).unwrap();
        assert!(row.enabled);
        assert_eq!(row.pending_window_days, 9);
        assert_eq!(row.reserve_floor_basis_points, 800);
    }

    #[test]
    fn test_upsert_rejects_out_of_range_values() {
        let store = PolicyStore::new();
        let result = store.upsert(Some(1), &enabled_update(91, 1000));
        assert!(matches!(
            result.unwrap_err(),
            LifecycleError::InvalidPolicyValue { .. }
        ));

        // Nothing was stored
        assert!(store.get_account_override(1).is_none());
    }

    #[test]
    fn test_at_most_one_row_per_account() {
        let store = PolicyStore::new();
        store.upsert(Some(1), &enabled_update(5, 800)).unwrap();
        store.upsert(Some(1), &enabled_update(6, 900)).unwrap();

        assert_eq!(store.account_policies.len(), 1);
        let row = store.get_account_override(1).unwrap();
        assert_eq!(row.pending_window_days, 6);
    }

    #[test]
    fn test_global_row_carries_no_account_id() {
        let store = PolicyStore::new();
        let row = store.upsert(None, &enabled_update(7, 1000)).unwrap();
        assert_eq!(row.account_id, None);
        assert_eq!(store.get_global_default().unwrap().account_id, None);
    }
}
