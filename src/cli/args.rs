use crate::types::FundPolicyUpdate;
use clap::Parser;
use std::path::PathBuf;

/// Replay fund events through the lifecycle engine
#[derive(Parser, Debug)]
#[command(name = "fund-lifecycle-engine")]
#[command(about = "Replay fund events through the lifecycle engine", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing fund events
    #[arg(value_name = "EVENTS", help = "Path to the input events CSV file")]
    pub events_file: PathBuf,

    /// Accounts seed file; without it, accounts are registered on first use
    #[arg(
        long = "accounts",
        value_name = "ACCOUNTS",
        help = "Path to a CSV file seeding account statuses"
    )]
    pub accounts_file: Option<PathBuf>,

    /// Where to write the final snapshot report (stdout if omitted)
    #[arg(
        long = "report",
        value_name = "REPORT",
        help = "Path to write the snapshot report CSV"
    )]
    pub report_file: Option<PathBuf>,

    /// Run a full treasury sweep after the event feed is consumed
    #[arg(long = "sweep", help = "Run a scheduled-style sweep after replay")]
    pub sweep: bool,

    /// Pending window applied by the replay's global policy
    #[arg(
        long = "pending-window-days",
        value_name = "DAYS",
        default_value_t = 0,
        help = "Pending window in days for the replay policy (default: 0, funds clear immediately)"
    )]
    pub pending_window_days: u32,

    /// Reserve floor applied by the replay's global policy
    #[arg(
        long = "reserve-bps",
        value_name = "BPS",
        default_value_t = 1000,
        help = "Reserve floor in basis points for the replay policy (default: 1000 = 10%)"
    )]
    pub reserve_floor_basis_points: u32,
}

impl CliArgs {
    /// The global policy update the replay installs before applying events
    pub fn to_policy_update(&self) -> FundPolicyUpdate {
        FundPolicyUpdate {
            enabled: Some(true),
            pending_window_days: Some(self.pending_window_days),
            reserve_floor_basis_points: Some(self.reserve_floor_basis_points),
        }
    }
}
