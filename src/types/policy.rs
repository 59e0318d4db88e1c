//! Fund policy types
//!
//! A policy row controls whether the lifecycle engine runs for an account,
//! how long incoming funds stay pending, and what fraction of available
//! funds is held back as a risk reserve. A row with `account_id = None` is
//! the global default; per-account rows override it outright.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::entry::AccountId;
use super::error::LifecycleError;

/// Fallback pending window when no policy row exists
pub const DEFAULT_PENDING_WINDOW_DAYS: u32 = 7;

/// Fallback reserve floor when no policy row exists (10%)
pub const DEFAULT_RESERVE_FLOOR_BASIS_POINTS: u32 = 1000;

/// Fallback enabled flag when no policy row exists
pub const DEFAULT_ENABLED: bool = false;

/// Upper bound for `pending_window_days`
pub const MAX_PENDING_WINDOW_DAYS: u32 = 90;

/// Upper bound for `reserve_floor_basis_points` (100%)
pub const MAX_RESERVE_FLOOR_BASIS_POINTS: u32 = 10_000;

/// Stored policy configuration row
///
/// At most one row exists per `account_id` value, and at most one row with
/// `account_id = None` (the global default). The policy store's upsert
/// semantics enforce both invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundPolicy {
    /// Owning account; `None` denotes the global default row
    pub account_id: Option<AccountId>,

    /// Whether the lifecycle engine runs for accounts resolving to this row
    pub enabled: bool,

    /// Days incoming funds stay pending before clearing (0-90)
    pub pending_window_days: u32,

    /// Reserve floor in basis points (0-10000, i.e. 0%-100%)
    pub reserve_floor_basis_points: u32,
}

/// Partial policy update; unset fields are left untouched on an existing
/// row and filled with the hardcoded defaults when creating a new one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundPolicyUpdate {
    pub enabled: Option<bool>,
    pub pending_window_days: Option<u32>,
    pub reserve_floor_basis_points: Option<u32>,
}

impl FundPolicyUpdate {
    /// Validate field ranges before the update reaches the policy store
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidPolicyValue` if `pending_window_days`
    /// exceeds 90 or `reserve_floor_basis_points` exceeds 10000.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if let Some(days) = self.pending_window_days {
            if days > MAX_PENDING_WINDOW_DAYS {
                return Err(LifecycleError::invalid_policy_value(
                    "pending_window_days",
                    days,
                    MAX_PENDING_WINDOW_DAYS,
                ));
            }
        }
        if let Some(bps) = self.reserve_floor_basis_points {
            if bps > MAX_RESERVE_FLOOR_BASIS_POINTS {
                return Err(LifecycleError::invalid_policy_value(
                    "reserve_floor_basis_points",
                    bps,
                    MAX_RESERVE_FLOOR_BASIS_POINTS,
                ));
            }
        }
        Ok(())
    }
}

/// A fully-resolved policy with values from the account row, the global
/// default row, or the hardcoded fallback
///
/// Resolution precedence is strict: an account-specific row wins outright
/// and is never merged field-by-field with the global default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPolicy {
    pub enabled: bool,
    pub pending_window_days: u32,
    pub reserve_floor_basis_points: u32,
}

impl ResolvedPolicy {
    /// The hardcoded fallback used when no policy row exists at all
    pub fn fallback() -> Self {
        ResolvedPolicy {
            enabled: DEFAULT_ENABLED,
            pending_window_days: DEFAULT_PENDING_WINDOW_DAYS,
            reserve_floor_basis_points: DEFAULT_RESERVE_FLOOR_BASIS_POINTS,
        }
    }

    /// Serialize for storage on the snapshot's `policy_config` field
    pub fn to_config(&self) -> Value {
        json!({
            "enabled": self.enabled,
            "pending_window_days": self.pending_window_days,
            "reserve_floor_basis_points": self.reserve_floor_basis_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_fallback_values() {
        let policy = ResolvedPolicy::fallback();
        assert!(!policy.enabled);
        assert_eq!(policy.pending_window_days, 7);
        assert_eq!(policy.reserve_floor_basis_points, 1000);
    }

    #[test]
    fn test_to_config_round_trip() {
        let policy = ResolvedPolicy {
            enabled: true,
            pending_window_days: 14,
            reserve_floor_basis_points: 2500,
        };
        let config = policy.to_config();
        assert_eq!(config["enabled"], json!(true));
        assert_eq!(config["pending_window_days"], json!(14));
        assert_eq!(config["reserve_floor_basis_points"], json!(2500));
    }

    #[rstest]
    #[case::valid_max_window(Some(90), None, true)]
    #[case::valid_max_bps(None, Some(10_000), true)]
    #[case::valid_zero(Some(0), Some(0), true)]
    #[case::window_too_large(Some(91), None, false)]
    #[case::bps_too_large(None, Some(10_001), false)]
    #[case::empty_update(None, None, true)]
    fn test_update_validation(
        #[case] days: Option<u32>,
        #[case] bps: Option<u32>,
        #[case] valid: bool,
    ) {
        let update = FundPolicyUpdate {
            enabled: None,
            pending_window_days: days,
            reserve_floor_basis_points: bps,
        };
        assert_eq!(update.validate().is_ok(), valid);
    }

    #[test]
    fn test_update_validation_error_names_field() {
        let update = FundPolicyUpdate {
            pending_window_days: Some(120),
            ..Default::default()
        };
        let err = update.validate().unwrap_err();
        assert!(err.to_string().contains("pending_window_days"));
        assert!(err.to_string().contains("120"));
    }
}
