//! Fund lifecycle service
//!
//! The external interface over the engine and stores: status reads, entry
//! listings, policy management, and the event triggers (payment received,
//! clawback, manual recalculation, scheduled sweep). This layer owns
//! account resolution; the engine assumes a valid account profile.

use std::sync::Arc;
use tracing::{info, warn};

use crate::core::engine::LifecycleEngine;
use crate::core::ledger::{LedgerStore, Pagination};
use crate::core::policy::{resolve_policy, PolicyStore};
use crate::core::snapshot::SnapshotCache;
use crate::core::traits::AccountDirectory;
use crate::types::{
    AccountId, AccountProfile, AccountStatus, FundPolicy, FundPolicyUpdate, FundState,
    FundStateEntry, FundStateStatus, FundStateSummary, IssuingStatus, LifecycleError,
    ResolvedPolicy, TransactionId,
};

/// Coordinates the lifecycle engine, the stores, and the account directory
pub struct FundLifecycleService {
    engine: LifecycleEngine,
    ledger: Arc<LedgerStore>,
    snapshots: Arc<SnapshotCache>,
    policies: Arc<PolicyStore>,
    accounts: Arc<dyn AccountDirectory>,
}

impl FundLifecycleService {
    /// Build a service over a fresh set of stores
    pub fn new(accounts: Arc<dyn AccountDirectory>) -> Self {
        let ledger = Arc::new(LedgerStore::new());
        let snapshots = Arc::new(SnapshotCache::new());
        let policies = Arc::new(PolicyStore::new());
        let engine = LifecycleEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&snapshots),
            Arc::clone(&policies),
        );
        FundLifecycleService {
            engine,
            ledger,
            snapshots,
            policies,
            accounts,
        }
    }

    /// Shared snapshot cache handle, for wiring up the authorization gate
    pub fn snapshots(&self) -> Arc<SnapshotCache> {
        Arc::clone(&self.snapshots)
    }

    /// Full fund status for an account, read from the snapshot cache
    ///
    /// Never triggers a recalculation. Returns zeros with no timestamp when
    /// the engine has not yet written a snapshot for the account.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AccountNotFound` for an unknown account id.
    pub fn get_fund_status(
        &self,
        account_id: AccountId,
    ) -> Result<FundStateStatus, LifecycleError> {
        let account = self.resolve_account(account_id)?;
        let snapshot = self.snapshots.get(account_id);

        let (summary, last_recalculated_at, policy_config) = match &snapshot {
            Some(snap) => (
                FundStateSummary::from_snapshot(snap),
                Some(snap.last_recalculated_at),
                Some(&snap.policy_config),
            ),
            None => (FundStateSummary::zero(), None, None),
        };

        let mut restrictions = Vec::new();
        match account.status {
            AccountStatus::UnderReview => restrictions.push("Account is under review".to_string()),
            AccountStatus::Denied => restrictions.push("Account has been denied".to_string()),
            AccountStatus::Active => {}
        }
        if account.issuing_status == IssuingStatus::TemporarilyRestricted {
            restrictions.push("Issuing is temporarily restricted".to_string());
        }

        let pending_explanation = if summary.pending_amount != 0 {
            let days = policy_config
                .and_then(|config| config["pending_window_days"].as_u64())
                .unwrap_or(crate::types::policy::DEFAULT_PENDING_WINDOW_DAYS as u64);
            Some(format!(
                "Funds are within the {}-day pending window",
                days
            ))
        } else {
            None
        };

        let reserve_explanation = if summary.reserve_amount != 0 {
            let bps = policy_config
                .and_then(|config| config["reserve_floor_basis_points"].as_u64())
                .unwrap_or(crate::types::policy::DEFAULT_RESERVE_FLOOR_BASIS_POINTS as u64);
            Some(format!(
                "{:.1}% reserve floor applied per policy",
                bps as f64 / 100.0
            ))
        } else {
            None
        };

        Ok(FundStateStatus {
            summary,
            issuing_status: account.issuing_status,
            restrictions,
            pending_explanation,
            reserve_explanation,
            last_recalculated_at,
        })
    }

    /// List ledger entries for an account, newest first
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AccountNotFound` for an unknown account id.
    pub fn list_entries(
        &self,
        account_id: AccountId,
        state: Option<FundState>,
        pagination: Pagination,
    ) -> Result<(Vec<FundStateEntry>, usize), LifecycleError> {
        self.resolve_account(account_id)?;
        Ok(self.ledger.list_entries(account_id, state, pagination))
    }

    /// The policy governing an account, fully resolved
    pub fn get_policy(&self, account_id: AccountId) -> ResolvedPolicy {
        resolve_policy(self.policies.get_for_account(account_id).as_ref())
    }

    /// Create or update a policy row (`None` targets the global default)
    ///
    /// Only the set fields of `update` are applied to an existing row; on
    /// creation unset fields take the hardcoded defaults.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidPolicyValue` for out-of-range fields.
    pub fn update_policy(
        &self,
        account_id: Option<AccountId>,
        update: &FundPolicyUpdate,
    ) -> Result<FundPolicy, LifecycleError> {
        let row = self.policies.upsert(account_id, update)?;
        info!(
            account_id = ?account_id,
            enabled = row.enabled,
            pending_window_days = row.pending_window_days,
            reserve_floor_basis_points = row.reserve_floor_basis_points,
            "fund_lifecycle.policy_updated"
        );
        Ok(row)
    }

    /// Record a cleared payment: create a pending entry, then recalculate
    ///
    /// # Errors
    ///
    /// `AccountNotFound` for an unknown account; `DuplicateTransaction` if
    /// a non-deleted entry already exists for the transaction id.
    pub fn record_payment_received(
        &self,
        account_id: AccountId,
        amount: i64,
        currency: &str,
        transaction_id: Option<TransactionId>,
    ) -> Result<FundStateSummary, LifecycleError> {
        let account = self.resolve_account(account_id)?;
        self.engine
            .create_pending_entry(account_id, amount, currency, transaction_id, None)?;
        self.engine.recalculate(&account, "payment_received")
    }

    /// Record a clawback (refund or dispute), then recalculate
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AccountNotFound` for an unknown account id.
    pub fn record_clawback(
        &self,
        account_id: AccountId,
        amount: i64,
        reason: &str,
    ) -> Result<FundStateSummary, LifecycleError> {
        let account = self.resolve_account(account_id)?;
        self.engine.clawback(account_id, amount, reason);
        self.engine
            .recalculate(&account, &format!("clawback:{}", reason))
    }

    /// Recalculate one account on demand
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AccountNotFound` for an unknown account id.
    pub fn trigger_recalculation(
        &self,
        account_id: AccountId,
        reason: &str,
    ) -> Result<FundStateSummary, LifecycleError> {
        let account = self.resolve_account(account_id)?;
        self.engine.recalculate(&account, reason)
    }

    /// Sweep every treasury-enabled account
    ///
    /// Accounts are processed sequentially in id order; each one runs in
    /// its own failure boundary so a single failure cannot abort the sweep.
    /// Returns the number of accounts successfully recalculated.
    pub fn recalculate_all(&self) -> usize {
        let mut processed = 0;
        for account in self.accounts.treasury_enabled_accounts() {
            match self.engine.recalculate(&account, "scheduled") {
                Ok(_) => processed += 1,
                Err(err) => {
                    warn!(
                        account_id = account.id,
                        error = %err,
                        "fund_lifecycle.sweep_account_failed"
                    );
                }
            }
        }
        info!(processed, "fund_lifecycle.sweep_completed");
        processed
    }

    fn resolve_account(&self, account_id: AccountId) -> Result<AccountProfile, LifecycleError> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| LifecycleError::account_not_found(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::InMemoryAccountDirectory;
    use crate::types::AccountProfile;

    struct Fixture {
        accounts: Arc<InMemoryAccountDirectory>,
        service: FundLifecycleService,
    }

    fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountDirectory::new());
        let service = FundLifecycleService::new(Arc::clone(&accounts) as Arc<dyn AccountDirectory>);
        Fixture { accounts, service }
    }

    fn enabled_fixture() -> Fixture {
        let f = fixture();
        f.accounts.upsert(AccountProfile::new(1));
        f.service
            .update_policy(
                None,
                &FundPolicyUpdate {
                    enabled: Some(true),
                    pending_window_days: Some(7),
                    reserve_floor_basis_points: Some(1000),
                },
            )
            .unwrap();
        f
    }

    #[test]
    fn test_unknown_account_is_rejected_before_the_engine_runs() {
        let f = fixture();
        for result in [
            f.service.trigger_recalculation(404, "manual").err(),
            f.service
                .record_payment_received(404, 100, "usd", None)
                .err(),
            f.service.record_clawback(404, 100, "refund").err(),
            f.service.get_fund_status(404).err(),
        ] {
            assert!(matches!(
                result,
                Some(LifecycleError::AccountNotFound { account: 404 })
            ));
        }
    }

    #[test]
    fn test_payment_received_creates_pending_entry_and_recalculates() {
        let f = enabled_fixture();

        let summary = f
            .service
            .record_payment_received(1, 50_000, "usd", Some(10))
            .unwrap();

        // Fresh funds sit inside the 7-day window
        assert_eq!(summary.pending_amount, 50_000);
        assert_eq!(summary.available_amount, 0);
        assert_eq!(summary.spendable_amount, 0);

        let (entries, total) = f.service.list_entries(1, None, Pagination::default()).unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries[0].amount, 50_000);
    }

    #[test]
    fn test_payment_received_duplicate_transaction_rejected() {
        let f = enabled_fixture();
        f.service
            .record_payment_received(1, 100, "usd", Some(10))
            .unwrap();

        let result = f.service.record_payment_received(1, 100, "usd", Some(10));
        assert!(matches!(
            result.unwrap_err(),
            LifecycleError::DuplicateTransaction {
                transaction: 10,
                account: 1
            }
        ));
    }

    #[test]
    fn test_clawback_absorbed_by_immediate_recalculation() {
        let f = enabled_fixture();
        // Zero-day window so the payment clears immediately
        f.service
            .update_policy(
                Some(1),
                &FundPolicyUpdate {
                    enabled: Some(true),
                    pending_window_days: Some(0),
                    reserve_floor_basis_points: Some(1000),
                },
            )
            .unwrap();
        f.service
            .record_payment_received(1, 50_000, "usd", None)
            .unwrap();

        let summary = f.service.record_clawback(1, 10_000, "refund").unwrap();
        assert_eq!(summary.available_amount, 40_000);
        assert_eq!(summary.reserve_amount, 4_000);
        assert_eq!(summary.spendable_amount, 36_000);
    }

    #[test]
    fn test_get_fund_status_without_snapshot_is_zeroed() {
        let f = fixture();
        f.accounts.upsert(AccountProfile::new(1));

        let status = f.service.get_fund_status(1).unwrap();
        assert_eq!(status.summary, FundStateSummary::zero());
        assert!(status.last_recalculated_at.is_none());
        assert!(status.restrictions.is_empty());
        assert!(status.pending_explanation.is_none());
        assert!(status.reserve_explanation.is_none());
    }

    #[test]
    fn test_get_fund_status_synthesizes_explanations() {
        let f = enabled_fixture();
        // Immediate clearing for half the funds, pending for the rest
        f.service
            .record_payment_received(1, 20_000, "usd", None)
            .unwrap();
        f.service
            .update_policy(
                Some(1),
                &FundPolicyUpdate {
                    enabled: Some(true),
                    pending_window_days: Some(0),
                    reserve_floor_basis_points: Some(1000),
                },
            )
            .unwrap();
        f.service
            .record_payment_received(1, 30_000, "usd", None)
            .unwrap();
        // Back to a 7-day window so the first payment stays pending
        f.service
            .update_policy(
                Some(1),
                &FundPolicyUpdate {
                    pending_window_days: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        f.service.trigger_recalculation(1, "manual").unwrap();

        let status = f.service.get_fund_status(1).unwrap();
        assert_eq!(
            status.pending_explanation.as_deref(),
            Some("Funds are within the 7-day pending window")
        );
        assert_eq!(
            status.reserve_explanation.as_deref(),
            Some("10.0% reserve floor applied per policy")
        );
        assert!(status.last_recalculated_at.is_some());
    }

    #[test]
    fn test_get_fund_status_reports_restrictions() {
        let f = fixture();
        f.accounts.upsert(AccountProfile {
            status: AccountStatus::UnderReview,
            issuing_status: IssuingStatus::TemporarilyRestricted,
            ..AccountProfile::new(1)
        });

        let status = f.service.get_fund_status(1).unwrap();
        assert_eq!(
            status.restrictions,
            vec![
                "Account is under review".to_string(),
                "Issuing is temporarily restricted".to_string(),
            ]
        );
        assert_eq!(status.issuing_status, IssuingStatus::TemporarilyRestricted);
    }

    #[test]
    fn test_get_policy_resolves_through_tiers() {
        let f = fixture();
        // No rows at all: hardcoded fallback
        assert_eq!(f.service.get_policy(1), ResolvedPolicy::fallback());

        f.service
            .update_policy(
                None,
                &FundPolicyUpdate {
                    enabled: Some(true),
                    pending_window_days: Some(10),
                    reserve_floor_basis_points: Some(2000),
                },
            )
            .unwrap();
        assert_eq!(f.service.get_policy(1).pending_window_days, 10);

        f.service
            .update_policy(
                Some(1),
                &FundPolicyUpdate {
                    enabled: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        // Account row wins outright with its own defaults, never merged
        assert_eq!(f.service.get_policy(1).pending_window_days, 7);
    }

    #[test]
    fn test_recalculate_all_sweeps_only_treasury_enabled_accounts() {
        let f = enabled_fixture();
        f.accounts.upsert(AccountProfile::new(2));
        f.accounts.upsert(AccountProfile {
            treasury_enabled: false,
            ..AccountProfile::new(3)
        });

        let processed = f.service.recalculate_all();
        assert_eq!(processed, 2);
        assert!(f.service.snapshots().get(1).is_some());
        assert!(f.service.snapshots().get(2).is_some());
        assert!(f.service.snapshots().get(3).is_none());
    }

    #[test]
    fn test_recalculation_is_idempotent_through_the_service() {
        let f = enabled_fixture();
        f.service
            .record_payment_received(1, 50_000, "usd", None)
            .unwrap();

        let first = f.service.trigger_recalculation(1, "manual").unwrap();
        let second = f.service.trigger_recalculation(1, "manual").unwrap();
        assert_eq!(first, second);
    }
}
