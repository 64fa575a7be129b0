//! Carrel Rules
//!
//! The institution's booking policy as one immutable snapshot.
//!
//! Every threshold used by the gatekeeper and the janitor comes from a
//! [`RuleConfig`] built once at startup and shared read-only afterwards
//! (typically behind an `Arc`). Nothing in the workspace reads policy values
//! from anywhere else.
//!
//! # Configuration
//!
//! Rules are loaded from TOML using the institution's option names. Every
//! key is optional:
//!
//! ```toml
//! MaxIntervalDayToBook = 7
//! MaxWeeklyBookingDays = 3
//! MaxDailyBookingsPerStudent = 2
//! MinReputationToBook = 60
//! MinCapacityPercentage = 50
//! MaxTimeToCheckin = 15      # minutes
//! MaxTimeToCheckout = 15     # minutes
//! SubstractReputation = 10
//! TimeStart = 7              # hour of day
//! TimeEnd = 22               # hour of day
//! TimeJobInterval = 5        # minutes
//! CancelTimeInterval = 30    # minutes
//! BaseReputation = 100
//! ReputationFloor = 0
//! ```
//!
//! ```
//! use carrel_rules::RuleConfig;
//!
//! let rules = RuleConfig::from_toml_str("MaxTimeToCheckin = 10").unwrap();
//! assert_eq!(rules.max_time_to_checkin, 10);
//! assert_eq!(rules.min_capacity_percentage, 50);
//! ```

#![warn(missing_docs)]

mod config;
mod error;

pub use config::RuleConfig;
pub use error::RuleError;
