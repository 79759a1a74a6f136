use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::services::PriceCheckEngine;

/// Drives the check engine on a fixed cadence. Exactly one scheduler is
/// spawned per process, which keeps cycles from overlapping; the engine
/// itself does not coordinate concurrent invocations.
pub struct Scheduler {
    engine: Arc<PriceCheckEngine>,
    period: Duration,
}

impl Scheduler {
    pub fn new(engine: Arc<PriceCheckEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    pub async fn start(self) {
        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            match self.engine.run_check_cycle().await {
                Ok(report) => {
                    tracing::info!(
                        "Check cycle finished: {} products considered, {} results",
                        report.considered,
                        report.results.len()
                    );
                }
                Err(e) => {
                    tracing::error!("Check cycle failed: {}", e);
                }
            }
        }
    }
}
