//! Error types for the Fund Lifecycle Engine
//!
//! # Error Categories
//!
//! - **Configuration errors**: policy values out of range, rejected at the
//!   input-validation boundary before reaching the engine
//! - **Not-found errors**: account unknown to the account directory
//! - **Duplicate errors**: a second payment entry for the same transaction
//! - **File I/O / CSV errors**: event-replay harness failures
//!
//! Note the deliberate absence of "wrong state" errors: recalculation and
//! entry creation are unconditionally valid operations, and the
//! authorization gate expresses every failure as a declined decision, not
//! an error.

use thiserror::Error;

use super::entry::{AccountId, TransactionId};

/// Main error type for the fund lifecycle engine
///
/// Each variant carries the context needed to diagnose the failure.
/// Higher layers translate `AccountNotFound` into 404s and
/// `InvalidPolicyValue` into 400s.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// Account unknown to the account directory
    ///
    /// Surfaced by the trigger layer before the engine is invoked; the
    /// engine itself assumes a valid account.
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The account that was not found
        account: AccountId,
    },

    /// A non-deleted entry already exists for this transaction
    ///
    /// Safety net against webhook replay; entry creation carries no other
    /// idempotency guarantee.
    #[error("Duplicate entry for transaction {transaction} on account {account}")]
    DuplicateTransaction {
        /// Transaction ID that is duplicated
        transaction: TransactionId,
        /// Account ID
        account: AccountId,
    },

    /// A policy update field is out of its allowed range
    ///
    /// Rejected at the validation boundary; resolved policies reaching the
    /// engine are always in range.
    #[error("Policy field {field} value {value} is out of range (0-{max})")]
    InvalidPolicyValue {
        /// Field that failed validation
        field: String,
        /// The rejected value
        value: u32,
        /// Inclusive upper bound
        max: u32,
    },

    /// File not found at the specified path
    ///
    /// Fatal for the event-replay harness.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading events or writing the report
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error in the event feed
    ///
    /// Recoverable: the malformed record is skipped and replay continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LifecycleError {
    fn from(error: std::io::Error) -> Self {
        LifecycleError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LifecycleError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());
        LifecycleError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper constructors for common errors

impl LifecycleError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LifecycleError::AccountNotFound { account }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(transaction: TransactionId, account: AccountId) -> Self {
        LifecycleError::DuplicateTransaction {
            transaction,
            account,
        }
    }

    /// Create an InvalidPolicyValue error
    pub fn invalid_policy_value(field: &str, value: u32, max: u32) -> Self {
        LifecycleError::InvalidPolicyValue {
            field: field.to_string(),
            value,
            max,
        }
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: &str) -> Self {
        LifecycleError::FileNotFound {
            path: path.to_string(),
        }
    }
}
