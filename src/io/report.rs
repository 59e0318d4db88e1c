//! Snapshot report writer
//!
//! Serializes the final per-account snapshots as CSV, sorted by account id
//! for deterministic output.

use std::io::Write;

use crate::io::event_format::SnapshotRecord;
use crate::types::{FundStateSnapshot, LifecycleError};

/// Write one report row per snapshot, sorted by account id
///
/// # Errors
///
/// Returns `LifecycleError::IoError` / `ParseError` on write failures.
pub fn write_snapshot_report<W: Write>(
    writer: W,
    snapshots: &[FundStateSnapshot],
) -> Result<(), LifecycleError> {
    let mut rows: Vec<&FundStateSnapshot> = snapshots.iter().collect();
    rows.sort_by_key(|snap| snap.account_id);

    let mut csv_writer = csv::Writer::from_writer(writer);
    for snap in rows {
        csv_writer.serialize(SnapshotRecord {
            account_id: snap.account_id,
            pending: snap.pending_amount,
            available: snap.available_amount,
            reserve: snap.reserve_amount,
            spendable: snap.spendable_amount,
            total: snap.total_amount(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
