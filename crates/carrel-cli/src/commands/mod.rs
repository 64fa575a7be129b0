//! Command implementations.

pub mod admin;
pub mod booking;
pub mod reputation;
pub mod sweep;

pub use self::admin::{execute_rules, execute_seed_room, execute_seed_slot};
pub use self::booking::{execute_book, execute_cancel, execute_check_in, execute_check_out};
pub use self::reputation::execute_reputation;
pub use self::sweep::{execute_run, execute_sweep};

use crate::error::Result;
use carrel_rules::RuleConfig;
use carrel_store::SqliteStore;
use chrono::NaiveDateTime;
use std::path::Path;
use std::sync::Arc;

/// Open the SQLite store with the rules' reputation policy.
///
/// Only commands that touch bookings or the ledger call this, so `rules`
/// works without a database.
pub fn open_store(db: &Path, rules: &RuleConfig) -> Result<Arc<SqliteStore>> {
    tracing::debug!("Opening store at {}", db.display());
    Ok(Arc::new(SqliteStore::new(db, rules.reputation_policy())?))
}

/// The explicit `--at` time, or the local wall clock.
pub(crate) fn resolve_now(at: Option<NaiveDateTime>) -> NaiveDateTime {
    at.unwrap_or_else(|| chrono::Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrel.db");

        let store = open_store(&path, &RuleConfig::default()).unwrap();
        assert!(path.exists());
        drop(store);
    }

    #[test]
    fn test_open_store_reports_unusable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("carrel.db");

        let err = open_store(&path, &RuleConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::CliError::Store(_)));
        assert!(!path.exists());
    }
}
