use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::engine::PingEngine;

/// Drives the engine on a fixed period.
///
/// One logical timer: starting runs a cycle immediately and then on every
/// tick. Interval bounds are the configuration layer's policy; the scheduler
/// accepts any positive period.
pub struct CheckScheduler {
    engine: Arc<PingEngine>,
    handle: Option<JoinHandle<()>>,
}

impl CheckScheduler {
    pub fn new(engine: Arc<PingEngine>) -> Self {
        Self { engine, handle: None }
    }

    /// Begin periodic checking. Restarts the timer if already running.
    pub fn start(&mut self, period: Duration) {
        assert!(!period.is_zero(), "check period must be positive");
        self.stop();

        info!(period_secs = period.as_secs_f64(), "starting check scheduler");

        let engine = self.engine.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut timer = interval(period);
            // A cycle slower than the period postpones the next tick rather
            // than bursting to catch up
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // First tick completes immediately
                timer.tick().await;
                let snapshot = engine.check_now().await;
                debug!(overall = %snapshot.overall_status, "scheduled cycle complete");
            }
        }));
    }

    /// Cancel the pending timer. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("check scheduler stopped");
        }
    }

    /// Swap the period: the old timer is cancelled and the next cycle fires
    /// immediately instead of waiting out the previous interval.
    pub fn reconfigure(&mut self, period: Duration) {
        self.start(period);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CheckScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
