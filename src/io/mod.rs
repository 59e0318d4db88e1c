//! CSV input/output for the event-replay harness
//!
//! - [`event_format`]: serde row types for events, accounts, and the report
//! - [`reader`]: streaming event reader and accounts loader
//! - [`report`]: final snapshot report writer

pub mod event_format;
pub mod reader;
pub mod report;

pub use event_format::{AccountRecord, EventRecord, EventType, SnapshotRecord};
pub use reader::{read_accounts, EventReader};
pub use report::write_snapshot_report;
