use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::monitor::PriceMonitor;

/// Creates the cooperative shutdown signal shared by the scheduler and the
/// monitor. Send `true` to stop the loop between sweeps and between items.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolves once shutdown has been requested. A dropped sender means
/// shutdown can no longer be requested, not that it was; in that case this
/// future never resolves.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drives the monitor in an unbounded loop with a fixed inter-sweep delay.
/// There is no terminal state under normal operation; the loop ends only
/// when the shutdown signal fires.
pub struct Scheduler {
    monitor: PriceMonitor,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(monitor: PriceMonitor, interval: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            monitor,
            interval,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            match self.monitor.run_sweep().await {
                Ok(summary) => info!(
                    checked = summary.checked,
                    alerts = summary.alerts_sent,
                    price_changes = summary.price_changes,
                    unchanged = summary.unchanged,
                    vanished = summary.vanished,
                    failed = summary.failed,
                    "sweep completed"
                ),
                // The store was wholly unavailable; sleep and retry next cycle
                Err(err) => error!(error = %err, "sweep aborted"),
            }

            if *self.shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = wait_for_shutdown(&mut self.shutdown) => break,
            }
        }

        info!("scheduler stopped");
    }
}
