//! Account profile types
//!
//! Accounts are owned by the account management subsystem; the lifecycle
//! engine only reads the status flags that gate its behavior. Profiles
//! reach the engine through the [`crate::core::AccountDirectory`] trait.

use serde::{Deserialize, Serialize};

use super::entry::AccountId;

/// Account review status, owned by account management
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    UnderReview,
    Denied,
}

/// Card-issuing status for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuingStatus {
    IssuingActive,
    TemporarilyRestricted,
    Inactive,
}

impl IssuingStatus {
    /// Snake-case string form, used in authorization decline reasons
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuingStatus::IssuingActive => "issuing_active",
            IssuingStatus::TemporarilyRestricted => "temporarily_restricted",
            IssuingStatus::Inactive => "inactive",
        }
    }
}

/// Connected-account mode
///
/// Only `Custom` accounts can be treasury-enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    Standard,
    Custom,
}

/// Read-only view of an account, referenced not owned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub status: AccountStatus,
    pub issuing_status: IssuingStatus,
    pub account_mode: AccountMode,
    pub treasury_enabled: bool,
}

impl AccountProfile {
    /// Create an active, issuing-active, treasury-enabled Custom account
    ///
    /// The common fixture for harnesses and tests; production profiles come
    /// from the account management subsystem.
    pub fn new(id: AccountId) -> Self {
        AccountProfile {
            id,
            status: AccountStatus::Active,
            issuing_status: IssuingStatus::IssuingActive,
            account_mode: AccountMode::Custom,
            treasury_enabled: true,
        }
    }

    /// Whether the account may authorize card spend
    pub fn is_issuing_active(&self) -> bool {
        self.issuing_status == IssuingStatus::IssuingActive
    }

    /// Whether the account participates in scheduled recalculation sweeps
    pub fn is_treasury_enabled(&self) -> bool {
        self.account_mode == AccountMode::Custom && self.treasury_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_profile_is_active_and_treasury_enabled() {
        let profile = AccountProfile::new(7);
        assert_eq!(profile.id, 7);
        assert!(profile.is_issuing_active());
        assert!(profile.is_treasury_enabled());
    }

    #[rstest]
    #[case(AccountMode::Custom, true, true)]
    #[case(AccountMode::Custom, false, false)]
    #[case(AccountMode::Standard, true, false)]
    #[case(AccountMode::Standard, false, false)]
    fn test_treasury_enabled_requires_custom_mode(
        #[case] mode: AccountMode,
        #[case] flag: bool,
        #[case] expected: bool,
    ) {
        let profile = AccountProfile {
            account_mode: mode,
            treasury_enabled: flag,
            ..AccountProfile::new(1)
        };
        assert_eq!(profile.is_treasury_enabled(), expected);
    }

    #[rstest]
    #[case(IssuingStatus::IssuingActive, "issuing_active")]
    #[case(IssuingStatus::TemporarilyRestricted, "temporarily_restricted")]
    #[case(IssuingStatus::Inactive, "inactive")]
    fn test_issuing_status_as_str(#[case] status: IssuingStatus, #[case] expected: &str) {
        assert_eq!(status.as_str(), expected);
    }
}
