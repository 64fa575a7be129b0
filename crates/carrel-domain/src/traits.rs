//! Trait definitions for external interactions
//!
//! These traits define the boundaries between booking policy and
//! infrastructure. Implementations live in other crates (carrel-store).
//!
//! Methods take `&self`: implementations are shared between the
//! request-handling path and the background sweeper, and serialize access
//! internally.

use crate::{
    Booking, BookingId, BookingStatus, ReputationRecord, Room, RoomId, Slot, SlotId, UserId,
    ViolationEvent, ViolationType,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Booking counts for the quota checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingCounts {
    /// Distinct days in the week with a booking by the user
    pub weekly_days: u32,

    /// Bookings by the user on the day itself
    pub daily: u32,
}

/// Timestamp to record alongside a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    /// Set `checked_in_at`
    CheckIn(NaiveDateTime),

    /// Set `checked_out_at` (kept if already set)
    CheckOut(NaiveDateTime),
}

/// Penalty applied to a set of users as part of a transition
#[derive(Debug, Clone, PartialEq)]
pub struct Penalty {
    /// Users to penalize, each exactly once
    pub users: Vec<UserId>,

    /// Points to subtract per user
    pub amount: u32,

    /// What the users failed to do
    pub kind: ViolationType,

    /// When the violation is recorded
    pub at: NaiveDateTime,
}

impl Penalty {
    /// Violation event to append for each penalized user
    pub fn event(&self, booking_id: BookingId) -> ViolationEvent {
        ViolationEvent {
            kind: self.kind,
            occurred_at: self.at,
            penalty: self.amount,
            booking_id: Some(booking_id),
        }
    }
}

/// A compare-and-set status change for one booking
///
/// Stores apply the status change, the stamp and the penalty all together
/// or not at all, and only while the booking is still in `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Booking to change
    pub booking_id: BookingId,

    /// Status the caller observed
    pub from: BookingStatus,

    /// Status to move to
    pub to: BookingStatus,

    /// Timestamp to record
    pub stamp: Option<Stamp>,

    /// Reputation penalty to apply
    pub penalty: Option<Penalty>,
}

/// Trait for reading rooms and slots
///
/// Implemented by the infrastructure layer (carrel-store)
pub trait RoomDirectory {
    /// Error type for lookups
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get a room by ID
    fn get_room(&self, id: RoomId) -> Result<Option<Room>, Self::Error>;

    /// Get a slot by ID
    fn get_slot(&self, id: SlotId) -> Result<Option<Slot>, Self::Error>;
}

/// Trait for storing bookings and moving them through their lifecycle
///
/// Implemented by the infrastructure layer (carrel-store)
pub trait BookingStore {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a newly admitted booking
    ///
    /// Returns `Ok(false)` without inserting when another booking already
    /// holds the same room and slot on that date.
    fn create_booking(&self, booking: &Booking) -> Result<bool, Self::Error>;

    /// Get a booking by ID
    fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, Self::Error>;

    /// Bookings in any of `statuses` dated on or before `date`
    fn list_bookings(
        &self,
        statuses: &[BookingStatus],
        date: NaiveDate,
    ) -> Result<Vec<Booking>, Self::Error>;

    /// Quota counts for `user` relative to `date`
    fn booking_counts(&self, user: &UserId, date: NaiveDate) -> Result<BookingCounts, Self::Error>;

    /// Apply a transition atomically
    ///
    /// Returns `Ok(false)` without changing anything when the booking is no
    /// longer in `transition.from`.
    fn apply_transition(&self, transition: &Transition) -> Result<bool, Self::Error>;
}

/// Trait for the per-user reputation ledger
///
/// Implemented by the infrastructure layer (carrel-store). Updates for one
/// user are serialized by the implementation.
pub trait ReputationLedger {
    /// Error type for ledger operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record a violation and decrement the user's score, clamped at the floor
    ///
    /// Returns the new score.
    fn penalize(
        &self,
        user: &UserId,
        amount: u32,
        kind: ViolationType,
        at: NaiveDateTime,
    ) -> Result<i32, Self::Error>;

    /// Current score (the baseline for users with no record)
    fn current_score(&self, user: &UserId) -> Result<i32, Self::Error>;

    /// Violations in the order they were recorded
    fn violations(&self, user: &UserId) -> Result<Vec<ViolationEvent>, Self::Error>;

    /// Full ledger record
    fn record(&self, user: &UserId) -> Result<ReputationRecord, Self::Error>;
}
