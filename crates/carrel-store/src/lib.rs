//! Carrel Storage Layer
//!
//! Implements the booking store, room directory and reputation ledger
//! contracts from `carrel_domain::traits`.
//!
//! Two backends:
//!
//! - [`SqliteStore`]: persistent, one SQLite file per deployment
//! - [`MemoryStore`]: process-local, for tests and dry runs
//!
//! Both apply a [`Transition`](carrel_domain::traits::Transition) and its
//! reputation penalties atomically, so a booking's status and its
//! participants' scores never diverge.
//!
//! # Examples
//!
//! ```no_run
//! use carrel_domain::ReputationPolicy;
//! use carrel_store::SqliteStore;
//!
//! let store = SqliteStore::new("carrel.db", ReputationPolicy::default()).unwrap();
//! // Store is now ready for booking operations
//! ```

#![warn(missing_docs)]

mod error;
mod memory;
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use carrel_domain::traits::Transition;
use carrel_domain::UserId;
use chrono::{NaiveDate, Weekday};

/// Reject transitions the booking lifecycle does not allow
fn check_transition(transition: &Transition) -> Result<(), StoreError> {
    if !transition.from.can_transition_to(transition.to) {
        return Err(StoreError::InvalidTransition {
            from: transition.from,
            to: transition.to,
        });
    }
    Ok(())
}

/// Users to penalize, each once
fn distinct_users(users: &[UserId]) -> Vec<UserId> {
    let mut users = users.to_vec();
    users.sort();
    users.dedup();
    users
}

/// Monday and Sunday of the week containing `date`
fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}
