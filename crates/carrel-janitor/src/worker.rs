//! Background worker for continuous sweeping

use crate::{Janitor, JanitorError, JanitorMetrics};
use carrel_domain::traits::BookingStore;
use carrel_domain::Clock;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Background worker that runs the janitor on a schedule
///
/// Ticks every `TimeJobInterval` minutes and sweeps only inside the
/// `TimeStart`..`TimeEnd` operating window. A failed cycle is logged and the
/// worker carries on with the next tick.
///
/// # Examples
///
/// ```no_run
/// use carrel_domain::SystemClock;
/// use carrel_janitor::{Janitor, JanitorWorker};
/// use carrel_rules::RuleConfig;
/// use carrel_store::SqliteStore;
/// use std::sync::Arc;
/// use tokio::sync::watch;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let rules = Arc::new(RuleConfig::default());
///     let store = Arc::new(SqliteStore::new("carrel.db", rules.reputation_policy())?);
///     let worker = JanitorWorker::new(Arc::new(Janitor::new(rules)), store, Arc::new(SystemClock));
///
///     let (shutdown_tx, shutdown_rx) = watch::channel(false);
///     tokio::spawn(async move {
///         let _ = tokio::signal::ctrl_c().await;
///         let _ = shutdown_tx.send(true);
///     });
///
///     worker.run(shutdown_rx).await?;
///     Ok(())
/// }
/// ```
pub struct JanitorWorker<S> {
    janitor: Arc<Janitor>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl<S> JanitorWorker<S>
where
    S: BookingStore + Send + Sync + 'static,
{
    /// Create a worker ticking at the rules' sweep interval
    pub fn new(janitor: Arc<Janitor>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let interval = janitor.rules().sweep_interval();
        Self {
            janitor,
            store,
            clock,
            interval,
        }
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The janitor this worker drives
    pub fn janitor(&self) -> &Arc<Janitor> {
        &self.janitor
    }

    /// Get the janitor's cumulative metrics
    pub fn metrics(&self) -> JanitorMetrics {
        self.janitor.metrics()
    }

    /// Run until `shutdown` turns true or its sender is dropped
    ///
    /// The signal is checked between cycles and, inside a cycle, between
    /// bookings; a booking's transition is never abandoned halfway.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), JanitorError> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Janitor worker started (interval: {:?})", self.interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.tick(Some(shutdown.clone())).await {
                        Ok(Some(metrics)) => {
                            tracing::info!(
                                "Sweep completed: {} expired, {} completed, {} penalties",
                                metrics.total_expired(),
                                metrics.completed,
                                metrics.penalties_applied
                            );
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!("Sweep failed: {}", e);
                        }
                    }
                }
            }
        }

        tracing::info!("Shutdown signal received, stopping janitor");
        tracing::info!("Janitor stopped. Final metrics:\n{}", self.janitor.metrics().summary());

        Ok(())
    }

    /// Run for a specific number of ticks (useful for testing)
    ///
    /// Unlike [`run`](Self::run), the first failed cycle is returned.
    pub async fn run_cycles(&self, cycles: usize) -> Result<(), JanitorError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Janitor worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);

            if let Err(e) = self.tick(None).await {
                tracing::error!("Sweep {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        tracing::info!(
            "Janitor finished {} cycles. Final metrics:\n{}",
            cycles,
            self.janitor.metrics().summary()
        );

        Ok(())
    }

    /// One tick: sweep on the blocking pool if inside operating hours
    async fn tick(
        &self,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<Option<JanitorMetrics>, JanitorError> {
        let now = self.clock.now();
        if !self.janitor.rules().is_within_operating_hours(now) {
            tracing::debug!(%now, "Outside operating hours, skipping sweep");
            return Ok(None);
        }

        let janitor = Arc::clone(&self.janitor);
        let store = Arc::clone(&self.store);

        let cycle = tokio::task::spawn_blocking(move || {
            let should_stop = || shutdown.as_ref().is_some_and(|rx| *rx.borrow());
            janitor.run_sweep_cycle_until(store.as_ref(), now, should_stop)
        })
        .await
        .map_err(|e| JanitorError::Worker(e.to_string()))??;

        Ok(Some(cycle))
    }
}
