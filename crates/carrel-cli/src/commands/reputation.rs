//! Reputation command implementation.

use crate::cli::ReputationArgs;
use crate::error::Result;
use crate::output::Formatter;
use carrel_domain::traits::ReputationLedger;
use carrel_domain::UserId;
use carrel_store::SqliteStore;

/// Execute the reputation command.
pub fn execute_reputation(args: ReputationArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let record = store.record(&UserId::new(args.user))?;
    println!("{}", formatter.reputation(&record)?);
    Ok(())
}
