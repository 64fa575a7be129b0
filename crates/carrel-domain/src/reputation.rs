//! Reputation ledger arithmetic
//!
//! A user's score starts at the policy baseline and only goes down through
//! violations, never below the policy floor. Stores persist
//! [`ReputationRecord`]s but all score arithmetic happens here so every
//! backend clamps the same way.

use crate::{BookingId, UserId};
use chrono::NaiveDateTime;

/// Kind of violation recorded against a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationType {
    /// Never checked in within the check-in grace window
    Checkin,

    /// Never checked out within the check-out grace window
    Checkout,
}

impl ViolationType {
    /// Get the violation name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::Checkin => "checkin",
            ViolationType::Checkout => "checkout",
        }
    }

    /// Parse a violation type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "checkin" => Some(ViolationType::Checkin),
            "checkout" => Some(ViolationType::Checkout),
            _ => None,
        }
    }
}

/// A single recorded violation
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationEvent {
    /// What went wrong
    pub kind: ViolationType,

    /// When the violation was recorded
    pub occurred_at: NaiveDateTime,

    /// Nominal penalty charged for this event
    pub penalty: u32,

    /// Booking that caused the violation, if any
    pub booking_id: Option<BookingId>,
}

/// Baseline and floor for reputation scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationPolicy {
    /// Score of a user with no recorded violations
    pub baseline: i32,

    /// Lowest score a user can reach
    pub floor: i32,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            baseline: 100,
            floor: 0,
        }
    }
}

/// Per-user standing and violation history
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationRecord {
    /// Owner of the record
    pub user: UserId,

    /// Current score
    pub score: i32,

    /// Violations in the order they were recorded
    pub violations: Vec<ViolationEvent>,
}

impl ReputationRecord {
    /// Fresh record at the policy baseline
    pub fn new(user: UserId, policy: &ReputationPolicy) -> Self {
        Self {
            user,
            score: policy.baseline,
            violations: Vec::new(),
        }
    }

    /// Append a violation and decrement the score, clamped at the floor
    ///
    /// Returns the new score.
    pub fn penalize(&mut self, event: ViolationEvent, policy: &ReputationPolicy) -> i32 {
        let penalty = i32::try_from(event.penalty).unwrap_or(i32::MAX);
        self.score = self.score.saturating_sub(penalty).max(policy.floor);
        self.violations.push(event);
        self.score
    }

    /// Sum of nominal penalties recorded so far
    pub fn total_penalty(&self) -> u64 {
        self.violations.iter().map(|v| u64::from(v.penalty)).sum()
    }
}
