use chrono::{FixedOffset, NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::db::Repository;
use crate::models::{Member, TrackedProduct};
use crate::notifiers::Notifier;
use crate::price::{alert_condition, normalize_price};
use crate::sources::PriceSource;
use crate::utils::error::{AppError, Result};

/// How a single tracked product was classified during a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Live price reached the target: alert sent, record removed.
    Alerted,
    /// Live price differs from the stored one: price and timestamp persisted.
    PriceChanged,
    /// Live price equals the stored one: only the timestamp persisted.
    Unchanged,
    /// The record (or its owner) was deleted concurrently; benign.
    Vanished,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SweepSummary {
    pub checked: usize,
    pub alerts_sent: usize,
    pub price_changes: usize,
    pub unchanged: usize,
    pub vanished: usize,
    pub failed: usize,
}

impl SweepSummary {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Alerted => self.alerts_sent += 1,
            ItemOutcome::PriceChanged => self.price_changes += 1,
            ItemOutcome::Unchanged => self.unchanged += 1,
            ItemOutcome::Vanished => self.vanished += 1,
        }
    }
}

/// Orchestrates one full pass over all tracked products. Collaborators are
/// injected so tests can run sweeps against fakes.
pub struct PriceMonitor {
    repo: Arc<dyn Repository>,
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    shutdown: watch::Receiver<bool>,
}

impl PriceMonitor {
    pub fn new(
        repo: Arc<dyn Repository>,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            repo,
            source,
            notifier,
            config,
            shutdown,
        }
    }

    /// Processes every tracked product exactly once. Per-item failures are
    /// logged and skipped; only a failure to obtain the product list itself
    /// aborts the sweep.
    pub async fn run_sweep(&mut self) -> Result<SweepSummary> {
        let products = self.repo.list_products().await?;
        let total = products.len();
        info!(products = total, "starting sweep");

        let mut summary = SweepSummary::default();
        let mut store_failures = 0usize;

        for (index, product) in products.into_iter().enumerate() {
            if *self.shutdown.borrow() {
                info!("shutdown requested, stopping sweep early");
                break;
            }

            summary.checked += 1;
            match self.process(&product).await {
                Ok(outcome) => summary.record(outcome),
                Err(err) => {
                    if matches!(err, AppError::Store(_)) {
                        store_failures += 1;
                    }
                    summary.failed += 1;
                    warn!(
                        product_id = %product.id,
                        url = %product.url,
                        error = %err,
                        "item check failed, skipping"
                    );
                }
            }

            if index + 1 < total {
                self.pause_between_items().await;
            }
        }

        if summary.checked > 0 && store_failures == summary.checked {
            error!("store unavailable for the entire sweep, operator attention needed");
        }

        Ok(summary)
    }

    async fn process(&self, product: &TrackedProduct) -> Result<ItemOutcome> {
        let owner = match self.repo.get_member(&product.member_id).await {
            Ok(member) => member,
            Err(err) if err.is_benign() => return Ok(ItemOutcome::Vanished),
            Err(err) => return Err(err),
        };

        let fetched = self.source.fetch(&product.url).await?;
        let current = normalize_price(&fetched.price)?;
        // Already normalized at rest, but re-validated every sweep.
        let target = normalize_price(&product.target_price.to_string())?;
        let now = self.local_now();

        if alert_condition(current, target) {
            // Send first; the record is deleted only once the alert is out,
            // so a failed delivery is retried on the next sweep.
            self.notifier
                .send(
                    &owner.email,
                    &alert_subject(&product.name),
                    &alert_body(&owner, product, &fetched.price),
                )
                .await?;
            info!(product_id = %product.id, member_id = %owner.id, "price alert sent");

            match self.repo.delete_product(&product.id).await {
                Ok(()) => {}
                Err(err) if err.is_benign() => {}
                Err(err) => return Err(err),
            }
            return Ok(ItemOutcome::Alerted);
        }

        let outcome = if current != product.current_price {
            self.repo.update_price(&product.id, current, now).await
        } else {
            self.repo.touch_last_checked(&product.id, now).await
        };

        match outcome {
            Ok(()) if current != product.current_price => Ok(ItemOutcome::PriceChanged),
            Ok(()) => Ok(ItemOutcome::Unchanged),
            Err(err) if err.is_benign() => Ok(ItemOutcome::Vanished),
            Err(err) => Err(err),
        }
    }

    /// Randomized throttle between outbound requests; cancellable so
    /// shutdown never waits out the pause.
    async fn pause_between_items(&mut self) {
        let delay_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.item_delay_min_ms..=self.config.item_delay_max_ms)
        };
        if delay_ms == 0 {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
            _ = crate::scheduler::wait_for_shutdown(&mut self.shutdown) => {}
        }
    }

    fn local_now(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(self.config.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        Utc::now().with_timezone(&offset).naive_local()
    }
}

pub fn alert_subject(product_name: &str) -> String {
    format!("Low price alert for {}", product_name)
}

pub fn alert_body(owner: &Member, product: &TrackedProduct, price_display: &str) -> String {
    format!(
        "Hi {}, {} is now available for {}.\nBuy it here\n{}",
        owner.name, product.name, price_display, product.url
    )
}
