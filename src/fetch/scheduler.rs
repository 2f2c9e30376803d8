//! Background snapshot refresh.

use metrics::counter;
use tokio::task::JoinHandle;

use crate::api::AppState;

#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedulerCfg {
    pub interval_secs: u64,
}

impl RefreshSchedulerCfg {
    /// `SNAPSHOT_REFRESH_INTERVAL_SECS`, defaulting to one hour.
    pub fn from_env() -> Self {
        let interval_secs = std::env::var("SNAPSHOT_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);
        Self { interval_secs }
    }
}

/// Spawn a lightweight task that periodically re-fetches the snapshot,
/// recomputes the index and records it in history + gauges. Failures are
/// logged and retried on the next tick.
pub fn spawn_refresh_scheduler(state: AppState, cfg: RefreshSchedulerCfg) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs));
        loop {
            ticker.tick().await;
            counter!("refresh_runs_total").increment(1);
            match state.refresh_and_record().await {
                Ok(report) => {
                    tracing::info!(
                        target: "refresh",
                        index = report.index,
                        interpretation = %report.interpretation,
                        "snapshot refresh tick"
                    );
                }
                Err(e) => {
                    tracing::warn!(target: "refresh", error = ?e, "snapshot refresh failed");
                }
            }
        }
    })
}
