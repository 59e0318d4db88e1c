//! Streaming CSV reader for the event feed
//!
//! Reads event and account rows one at a time. Fatal errors (missing file)
//! are returned from the constructor; individual malformed rows are yielded
//! as `Err` so replay can log and continue past them.

use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;
use tracing::warn;

use crate::io::event_format::{AccountRecord, EventRecord};
use crate::types::{AccountProfile, LifecycleError};

/// Streaming iterator over event feed rows
///
/// Yields `Result<EventRecord, LifecycleError>` per CSV row; parse errors
/// carry the offending line number.
#[derive(Debug)]
pub struct EventReader {
    reader: csv::Reader<File>,
}

impl EventReader {
    /// Open an event feed for streaming iteration
    ///
    /// The reader trims whitespace and tolerates flexible field counts
    /// (trailing optional columns may be omitted).
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::FileNotFound` if the path does not exist,
    /// or `LifecycleError::IoError` if it cannot be opened.
    pub fn new(path: &Path) -> Result<Self, LifecycleError> {
        if !path.exists() {
            return Err(LifecycleError::file_not_found(&path.display().to_string()));
        }
        let file = File::open(path)?;
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);
        Ok(EventReader { reader })
    }
}

impl Iterator for EventReader {
    type Item = Result<EventRecord, LifecycleError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.reader.deserialize::<EventRecord>().next()?;
        Some(record.map_err(LifecycleError::from))
    }
}

/// Read the accounts seed file into directory profiles
///
/// Malformed rows are skipped with a warning; an empty or fully-malformed
/// file yields an empty vector.
///
/// # Errors
///
/// Returns `LifecycleError::FileNotFound` / `IoError` for file-level
/// failures only.
pub fn read_accounts(path: &Path) -> Result<Vec<AccountProfile>, LifecycleError> {
    if !path.exists() {
        return Err(LifecycleError::file_not_found(&path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut profiles = Vec::new();
    for record in reader.deserialize::<AccountRecord>() {
        match record {
            Ok(record) => profiles.push(record.to_profile()),
            Err(err) => {
                let error = LifecycleError::from(err);
                warn!(error = %error, "skipping malformed account row");
            }
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::event_format::EventType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_event_reader_fails_on_missing_file() {
        let result = EventReader::new(Path::new("nonexistent.csv"));
        assert!(matches!(
            result.unwrap_err(),
            LifecycleError::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_event_reader_streams_valid_rows() {
        let file = temp_csv(
            "event,account_id,amount,currency,transaction_id,reason\n\
             payment_received,1,50000,usd,10,\n\
             clawback,1,10000,usd,,refund\n\
             recalculate,1,,,,\n",
        );

        let reader = EventReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].event, EventType::PaymentReceived);
        assert_eq!(records[1].event, EventType::Clawback);
        assert_eq!(records[2].event, EventType::Recalculate);
    }

    #[test]
    fn test_event_reader_continues_past_malformed_rows() {
        let file = temp_csv(
            "event,account_id,amount,currency,transaction_id,reason\n\
             payment_received,1,50000,usd,10,\n\
             chargeback,2,100,usd,,\n\
             recalculate,3,,,,\n",
        );

        let reader = EventReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.collect();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
        assert!(records[2].is_ok());
    }

    #[test]
    fn test_event_reader_trims_whitespace() {
        let file = temp_csv(
            "event,account_id,amount,currency,transaction_id,reason\n\
             payment_received ,  1 , 50000 , usd , 10 ,\n",
        );

        let reader = EventReader::new(file.path()).unwrap();
        let records: Vec<_> = reader.filter_map(Result::ok).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account_id, 1);
        assert_eq!(records[0].amount, Some(50_000));
    }

    #[test]
    fn test_event_reader_empty_after_header() {
        let file = temp_csv("event,account_id,amount,currency,transaction_id,reason\n");
        let reader = EventReader::new(file.path()).unwrap();
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_read_accounts_skips_malformed_rows() {
        let file = temp_csv(
            "account_id,status,issuing_status,treasury_enabled\n\
             1,active,issuing_active,true\n\
             2,bogus_status,issuing_active,true\n\
             3,denied,inactive,false\n",
        );

        let profiles = read_accounts(file.path()).unwrap();
        let ids: Vec<_> = profiles.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_read_accounts_missing_file() {
        let result = read_accounts(Path::new("nonexistent.csv"));
        assert!(matches!(
            result.unwrap_err(),
            LifecycleError::FileNotFound { .. }
        ));
    }
}
