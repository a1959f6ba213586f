use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::state::AppState;

/// Spawn the periodic drain task
///
/// Each cycle is one bounded batch; a failed cycle is logged and the loop
/// keeps its cadence rather than catching up on missed ticks.
pub fn spawn(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.drain_interval_secs);
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "Drain scheduler started");
        loop {
            ticker.tick().await;
            match state.run_drain_cycle().await {
                Ok(report) => {
                    if !report.updated.is_empty() || !report.failures.is_empty() {
                        info!(
                            updated = report.updated.len(),
                            failures = report.failures.len(),
                            "Scheduled drain cycle finished"
                        );
                    }
                }
                Err(e) => error!(error = %e, "Scheduled drain cycle failed"),
            }
        }
    })
}
