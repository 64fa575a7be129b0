//! Carrel CLI - booking admission and lifecycle sweeps from the command line.

use carrel_cli::commands;
use carrel_cli::{Cli, Command, Formatter};
use carrel_gatekeeper::Gatekeeper;
use carrel_janitor::Janitor;
use carrel_rules::RuleConfig;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> carrel_cli::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rules = match &cli.rules {
        Some(path) => {
            tracing::debug!("Loading rules from {}", path.display());
            RuleConfig::from_file(path)?
        }
        None => {
            tracing::warn!("No rule file given, using built-in defaults");
            RuleConfig::default()
        }
    };
    let rules = Arc::new(rules);

    let formatter = Formatter::new(cli.format, !cli.no_color);

    let db = cli.db.as_path();

    match cli.command {
        Command::Rules => {
            commands::execute_rules(&rules)?;
        }
        Command::Run(args) => {
            let store = commands::open_store(db, &rules)?;
            commands::execute_run(args, Arc::clone(&rules), store, &formatter).await?;
        }
        Command::Sweep(args) => {
            let store = commands::open_store(db, &rules)?;
            commands::execute_sweep(args, Arc::clone(&rules), &store, &formatter)?;
        }
        Command::Reputation(args) => {
            let store = commands::open_store(db, &rules)?;
            commands::execute_reputation(args, &store, &formatter)?;
        }
        Command::Book(args) => {
            let store = commands::open_store(db, &rules)?;
            let gatekeeper = Gatekeeper::new(Arc::clone(&rules));
            commands::execute_book(args, &gatekeeper, &store, &formatter)?;
        }
        Command::Cancel(args) => {
            let store = commands::open_store(db, &rules)?;
            let janitor = Janitor::new(Arc::clone(&rules));
            commands::execute_cancel(args, &janitor, &store, &formatter)?;
        }
        Command::CheckIn(args) => {
            let store = commands::open_store(db, &rules)?;
            let janitor = Janitor::new(Arc::clone(&rules));
            commands::execute_check_in(args, &janitor, &store, &formatter)?;
        }
        Command::CheckOut(args) => {
            let store = commands::open_store(db, &rules)?;
            let janitor = Janitor::new(Arc::clone(&rules));
            commands::execute_check_out(args, &janitor, &store, &formatter)?;
        }
        Command::SeedRoom(args) => {
            let store = commands::open_store(db, &rules)?;
            commands::execute_seed_room(args, &store, &formatter)?;
        }
        Command::SeedSlot(args) => {
            let store = commands::open_store(db, &rules)?;
            commands::execute_seed_slot(args, &store, &formatter)?;
        }
    }

    Ok(())
}
