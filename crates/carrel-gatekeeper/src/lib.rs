//! Carrel Gatekeeper
//!
//! Decides whether a booking request is admissible under the institution's
//! rules, and turns admitted requests into pending bookings.
//!
//! The gatekeeper provides:
//! - A pure validator ([`Gatekeeper::validate`]) over pre-fetched inputs
//! - An admission flow ([`Gatekeeper::submit`]) that fetches those inputs
//!   from the store, validates, and persists the booking
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. Date bounds (past, too far ahead, slot already started today)
//! 2. Capacity bounds (minimum occupancy percentage, room capacity)
//! 3. Reputation gate
//! 4. Weekly and daily quotas
//! 5. Room and slot availability
//!
//! # Examples
//!
//! ```no_run
//! use carrel_gatekeeper::Gatekeeper;
//! use carrel_rules::RuleConfig;
//! use std::sync::Arc;
//!
//! let gatekeeper = Gatekeeper::new(Arc::new(RuleConfig::default()));
//! // let outcome = gatekeeper.submit(&request, now, &store)?;
//! ```

#![warn(missing_docs)]

mod admission;
mod error;
mod validator;

pub use admission::AdmissionOutcome;
pub use error::GatekeeperError;
pub use validator::{AdmissionDecision, Gatekeeper, Standing};
