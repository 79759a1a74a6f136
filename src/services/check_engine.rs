use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::db::{ Datastore, decimal_to_f64 };
use crate::db::entity::product;
use crate::enums::CheckStatus;
use crate::error::Result;
use crate::fetcher::PriceFetcher;
use crate::notifier::Notifier;

use super::alert_evaluator::{ self, AlertDecision };
use super::trend;

/// One per-product or per-alert outcome within a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub asin: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CheckResult {
    fn failed(asin: &str, detail: String) -> Self {
        Self {
            asin: asin.to_string(),
            status: CheckStatus::Failed,
            current_price: None,
            target_price: None,
            detail: Some(detail),
        }
    }

    fn error(asin: &str, detail: String) -> Self {
        Self {
            asin: asin.to_string(),
            status: CheckStatus::Error,
            current_price: None,
            target_price: None,
            detail: Some(detail),
        }
    }

    fn no_alerts(asin: &str, current_price: f64) -> Self {
        Self {
            asin: asin.to_string(),
            status: CheckStatus::CheckedNoAlerts,
            current_price: Some(current_price),
            target_price: None,
            detail: None,
        }
    }

    fn for_alert(asin: &str, status: CheckStatus, current_price: f64, target_price: f64) -> Self {
        Self {
            asin: asin.to_string(),
            status,
            current_price: Some(current_price),
            target_price: Some(target_price),
            detail: None,
        }
    }
}

/// The engine's sole externally observable output per run, alongside the
/// persisted mutations.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Number of active products the cycle set out to check.
    pub considered: usize,
    pub results: Vec<CheckResult>,
}

/// Walks every active product once: fetch the current price, append it
/// to history, recompute the prediction, judge each subscription, and
/// dispatch notifications. Products are processed strictly sequentially
/// with a pacing delay in between; any single product's failure is
/// recorded and never aborts the cycle.
pub struct PriceCheckEngine {
    store: Arc<dyn Datastore>,
    fetcher: Arc<dyn PriceFetcher>,
    notifier: Arc<dyn Notifier>,
    item_delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl PriceCheckEngine {
    pub fn new(
        store: Arc<dyn Datastore>,
        fetcher: Arc<dyn PriceFetcher>,
        notifier: Arc<dyn Notifier>,
        item_delay: Duration
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            item_delay,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cooperative cancellation. The flag is consulted
    /// between products, never mid-fetch; already-processed products
    /// keep their updates.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Run one full pass over all active products. Fails only when the
    /// active-product listing itself cannot be loaded; every narrower
    /// failure becomes an entry in the report.
    pub async fn run_check_cycle(&self) -> Result<CycleReport> {
        let products = self.store.list_active_products().await?;
        let considered = products.len();
        let mut results = Vec::new();

        for (idx, product) in products.iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                tracing::info!(
                    "Check cycle cancelled after {} of {} products",
                    idx,
                    considered
                );
                break;
            }

            match self.fetcher.fetch_price(&product.url).await {
                Ok(current_price) => {
                    match self.process_product(product, current_price).await {
                        Ok(mut outcomes) => results.append(&mut outcomes),
                        Err(e) => {
                            tracing::error!("Error checking product {}: {}", product.asin, e);
                            results.push(CheckResult::error(&product.asin, e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Could not fetch price for {}: {}", product.asin, e);
                    results.push(CheckResult::failed(&product.asin, e.to_string()));
                }
            }

            // Pacing between products, so the source is not hammered.
            if idx + 1 < considered && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        Ok(CycleReport { considered, results })
    }

    /// Steps 2-4 of the cycle for one product: persist the observation,
    /// recompute the prediction from full history, judge every active
    /// alert. Datastore failures here are scoped to this product.
    async fn process_product(
        &self,
        product: &product::Model,
        current_price: f64
    ) -> Result<Vec<CheckResult>> {
        let now = Utc::now();

        self.store.append_price_point(product.id, current_price, now).await?;
        self.store.update_product_price(product.id, current_price, now).await?;

        let history = self.store.list_price_history(product.id).await?;
        let prices: Vec<f64> = history
            .iter()
            .filter_map(|point| decimal_to_f64(point.price))
            .collect();
        let prediction = trend::analyze(&prices, current_price);

        let alerts = self.store.list_active_alerts(product.id).await?;
        if alerts.is_empty() {
            return Ok(vec![CheckResult::no_alerts(&product.asin, current_price)]);
        }

        let mut results = Vec::with_capacity(alerts.len());

        for alert in &alerts {
            // The cached prediction refreshes on every check when the
            // alert is in prediction mode, whatever the outcome below.
            if alert.use_prediction {
                self.store.set_predicted_price(alert.id, prediction.target_price).await?;
            }

            let target = alert_evaluator::effective_target(
                alert.target_price.and_then(decimal_to_f64),
                alert.predicted_price.and_then(decimal_to_f64),
                prediction.target_price
            );

            match alert_evaluator::evaluate(current_price, target, alert.notified_at, now) {
                AlertDecision::Fire => {
                    if
                        let Err(e) = self.notifier.notify(
                            &alert.user_email,
                            product,
                            alert,
                            current_price
                        ).await
                    {
                        tracing::warn!(
                            "Failed to deliver alert {} for {}: {}",
                            alert.id,
                            product.asin,
                            e
                        );
                    }

                    // Stamped on the fire decision, not on confirmed
                    // delivery, so a broken mail path cannot cause a
                    // re-attempt storm next cycle.
                    self.store.mark_notified(alert.id, now).await?;

                    tracing::info!(
                        "Alert sent for {} at ${:.2} (target ${:.2})",
                        product.asin,
                        current_price,
                        target
                    );
                    results.push(
                        CheckResult::for_alert(
                            &product.asin,
                            CheckStatus::AlertSent,
                            current_price,
                            target
                        )
                    );
                }
                AlertDecision::SuppressRecent => {
                    results.push(
                        CheckResult::for_alert(
                            &product.asin,
                            CheckStatus::AlertRecentlyNotified,
                            current_price,
                            target
                        )
                    );
                }
                AlertDecision::NotTriggered => {
                    results.push(
                        CheckResult::for_alert(
                            &product.asin,
                            CheckStatus::Checked,
                            current_price,
                            target
                        )
                    );
                }
            }
        }

        Ok(results)
    }
}
