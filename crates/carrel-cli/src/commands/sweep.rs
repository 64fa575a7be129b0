//! Sweep commands: the long-running worker and a single cycle.

use super::resolve_now;
use crate::cli::{RunArgs, SweepArgs};
use crate::error::Result;
use crate::output::Formatter;
use carrel_domain::SystemClock;
use carrel_janitor::{Janitor, JanitorWorker};
use carrel_rules::RuleConfig;
use carrel_store::SqliteStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Run the sweeper until Ctrl+C.
pub async fn execute_run(
    args: RunArgs,
    rules: Arc<RuleConfig>,
    store: Arc<SqliteStore>,
    formatter: &Formatter,
) -> Result<()> {
    let janitor = Arc::new(Janitor::new(rules).with_dry_run(args.dry_run));
    let worker = JanitorWorker::new(janitor, store, Arc::new(SystemClock));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C"),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    worker.run(shutdown_rx).await?;
    println!("{}", formatter.metrics(&worker.metrics())?);
    Ok(())
}

/// Run one sweep cycle immediately, ignoring the operating window.
pub fn execute_sweep(
    args: SweepArgs,
    rules: Arc<RuleConfig>,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let janitor = Janitor::new(rules).with_dry_run(args.dry_run);
    let now = resolve_now(args.at);

    tracing::info!(%now, dry_run = args.dry_run, "Running single sweep");
    let metrics = janitor.run_sweep_cycle(store, now)?;

    println!("{}", formatter.metrics(&metrics)?);
    Ok(())
}
