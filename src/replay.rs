//! Event-replay pipeline
//!
//! Wires the CSV reader, the service, and the report writer together:
//! seed the account directory, install the replay policy, apply the event
//! feed row by row, optionally run a sweep, and emit the final snapshots.
//!
//! Row-level failures (malformed CSV, duplicate transactions, unknown
//! accounts) are logged and skipped; only file-level failures abort.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::core::traits::{AccountDirectory, InMemoryAccountDirectory};
use crate::io::event_format::{EventRecord, EventType};
use crate::io::reader::{read_accounts, EventReader};
use crate::io::report::write_snapshot_report;
use crate::service::FundLifecycleService;
use crate::types::{AccountProfile, LifecycleError};

/// Run the full replay pipeline described by the CLI arguments
///
/// # Errors
///
/// Returns file-level errors only (missing input, unreadable accounts
/// file, unwritable report); row-level failures are skipped with warnings.
pub fn run_replay(args: &CliArgs) -> Result<(), LifecycleError> {
    let accounts = Arc::new(InMemoryAccountDirectory::new());
    let seeded = match &args.accounts_file {
        Some(path) => {
            for profile in read_accounts(path)? {
                accounts.upsert(profile);
            }
            true
        }
        None => false,
    };

    let service = FundLifecycleService::new(
        Arc::clone(&accounts) as Arc<dyn AccountDirectory>
    );
    service.update_policy(None, &args.to_policy_update())?;

    let mut applied = 0usize;
    let mut skipped = 0usize;
    for row in EventReader::new(&args.events_file)? {
        let record = match row {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "skipping malformed event row");
                skipped += 1;
                continue;
            }
        };

        // Without a seed file, accounts are registered on first sight
        if !seeded && accounts.get(record.account_id).is_none() {
            accounts.upsert(AccountProfile::new(record.account_id));
        }

        match apply_event(&service, &record) {
            Ok(()) => applied += 1,
            Err(err) => {
                warn!(
                    account_id = record.account_id,
                    error = %err,
                    "skipping failed event"
                );
                skipped += 1;
            }
        }
    }

    if args.sweep {
        let processed = service.recalculate_all();
        info!(processed, "replay sweep finished");
    }
    info!(applied, skipped, "event replay finished");

    let snapshots = service.snapshots().all();
    match &args.report_file {
        Some(path) => write_snapshot_report(File::create(path)?, &snapshots)?,
        None => write_snapshot_report(io::stdout().lock(), &snapshots)?,
    }
    io::stdout().flush()?;
    Ok(())
}

fn apply_event(
    service: &FundLifecycleService,
    record: &EventRecord,
) -> Result<(), LifecycleError> {
    match record.event {
        EventType::PaymentReceived => {
            let amount = record.amount.ok_or_else(|| LifecycleError::ParseError {
                line: None,
                message: "payment_received event is missing an amount".to_string(),
            })?;
            let currency = record.currency.as_deref().unwrap_or("usd");
            service.record_payment_received(
                record.account_id,
                amount,
                currency,
                record.transaction_id,
            )?;
        }
        EventType::Clawback => {
            let amount = record.amount.ok_or_else(|| LifecycleError::ParseError {
                line: None,
                message: "clawback event is missing an amount".to_string(),
            })?;
            let reason = record.reason.as_deref().unwrap_or("unspecified");
            service.record_clawback(record.account_id, amount, reason)?;
        }
        EventType::Recalculate => {
            let reason = record.reason.as_deref().unwrap_or("manual");
            service.trigger_recalculation(record.account_id, reason)?;
        }
    }
    Ok(())
}
