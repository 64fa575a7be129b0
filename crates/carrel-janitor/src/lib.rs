//! Carrel Janitor
//!
//! Booking lifecycle service: reclaims abandoned bookings on a schedule and
//! handles the synchronous lifecycle requests.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Check-in expiry**: pending bookings nobody checked into within
//!   `MaxTimeToCheckin` of slot start become `Expired`, and every participant
//!   loses `SubstractReputation` points with a `checkin` violation
//! - **Check-out expiry**: checked-in bookings nobody checked out of within
//!   `MaxTimeToCheckout` of slot end become `Expired` with a `checkout` violation
//! - **Lifecycle requests**: cancel, check in, check out
//! - **Metrics collection**: tracking sweep outcomes for monitoring
//!
//! ## Lifecycle
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | Pending | CheckedIn | Participant checks in during the grace window |
//! | Pending | Cancelled | Owner cancels at least `CancelTimeInterval` before start |
//! | Pending | Expired | Sweep after the check-in grace window (penalty) |
//! | CheckedIn | Completed | Participant checks out |
//! | CheckedIn | Expired | Sweep after the check-out grace window (penalty) |
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use carrel_janitor::Janitor;
//! use carrel_rules::RuleConfig;
//! use carrel_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = Arc::new(RuleConfig::default());
//! let store = SqliteStore::new("carrel.db", rules.reputation_policy())?;
//! let janitor = Janitor::new(rules);
//!
//! let metrics = janitor.run_sweep_cycle(&store, chrono::Local::now().naive_local())?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`JanitorWorker`]: it ticks every `TimeJobInterval` minutes, sweeps
//! only between `TimeStart` and `TimeEnd`, and stops on a
//! `tokio::sync::watch` shutdown signal.

#![warn(missing_docs)]

mod error;
mod janitor;
mod lifecycle;
mod metrics;
mod worker;

pub use error::{JanitorError, LifecycleError};
pub use janitor::Janitor;
pub use metrics::JanitorMetrics;
pub use worker::JanitorWorker;
