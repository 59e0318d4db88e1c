//! Capability traits for external collaborators
//!
//! Account status and issuing status are owned by the account management
//! subsystem. The engine reads them through the `AccountDirectory` trait so
//! it can be tested against a fake restriction source.

use dashmap::DashMap;

use crate::types::{AccountId, AccountProfile};

/// Read-only source of account profiles and restriction flags
///
/// Implementations must be safe for concurrent reads; the scheduler, the
/// trigger surface, and the authorization gate all consult the directory.
pub trait AccountDirectory: Send + Sync {
    /// Look up one account profile
    fn get(&self, account_id: AccountId) -> Option<AccountProfile>;

    /// All accounts eligible for the scheduled recalculation sweep
    /// (account_mode = custom AND treasury_enabled)
    fn treasury_enabled_accounts(&self) -> Vec<AccountProfile>;
}

/// In-memory account directory
///
/// Backs the replay harness and tests; production deployments adapt the
/// account management subsystem behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: DashMap<AccountId, AccountProfile>,
}

impl InMemoryAccountDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        InMemoryAccountDirectory {
            accounts: DashMap::new(),
        }
    }

    /// Insert or replace a profile
    pub fn upsert(&self, profile: AccountProfile) {
        self.accounts.insert(profile.id, profile);
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the directory holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn get(&self, account_id: AccountId) -> Option<AccountProfile> {
        self.accounts.get(&account_id).map(|p| *p)
    }

    fn treasury_enabled_accounts(&self) -> Vec<AccountProfile> {
        let mut accounts: Vec<AccountProfile> = self
            .accounts
            .iter()
            .filter(|entry| entry.value().is_treasury_enabled())
            .map(|entry| *entry.value())
            .collect();
        // Deterministic sweep order
        accounts.sort_by_key(|profile| profile.id);
        accounts
    }
}
