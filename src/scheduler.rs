//! Scheduled recalculation sweep
//!
//! Runs the treasury sweep on a fixed cadence. The sweep itself tolerates
//! per-account failure, so a tick never aborts; a missed tick (slow sweep)
//! is delayed rather than burst-replayed.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::service::FundLifecycleService;

/// Production sweep cadence
pub const SWEEP_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Run the recalculation sweep forever on the given period
///
/// The first sweep fires immediately; subsequent sweeps follow the period.
/// Callers wanting a bounded run should wrap this in a select or abort the
/// task.
pub async fn run_scheduled_sweeps(service: Arc<FundLifecycleService>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let processed = service.recalculate_all();
        info!(processed, "fund_lifecycle.scheduled_sweep_tick");
    }
}
