//! Fund Lifecycle Engine CLI
//!
//! Replays a CSV feed of fund events (payments, clawbacks, manual
//! recalculations) through the lifecycle engine and writes the final
//! per-account snapshots as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- events.csv > snapshots.csv
//! cargo run -- --accounts accounts.csv --sweep events.csv > snapshots.csv
//! cargo run -- --pending-window-days 7 --reserve-bps 2500 events.csv
//! ```
//!
//! Logging verbosity follows the `RUST_LOG` environment variable
//! (e.g. `RUST_LOG=fund_lifecycle_engine=debug`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing input file, unreadable accounts file, etc.)

use fund_lifecycle_engine::cli;
use fund_lifecycle_engine::replay;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    if let Err(e) = replay::run_replay(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
