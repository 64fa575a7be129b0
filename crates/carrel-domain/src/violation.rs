//! Policy violations - expected, user-facing, non-retryable rejections

use crate::{BookingStatus, RoomStatus, SlotStatus};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Reason a booking request or lifecycle operation was refused
///
/// These are values, not failures: callers surface [`code`](Self::code) and
/// the `Display` message to the user and do not retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyViolation {
    /// Requested date lies before today
    #[error("Booking date {requested} is in the past (today is {today})")]
    DatePast {
        /// Requested date
        requested: NaiveDate,
        /// Current date
        today: NaiveDate,
    },

    /// Requested date lies beyond the advance-booking horizon
    #[error("Booking date {requested} is too far ahead (latest bookable date is {latest})")]
    DateTooFar {
        /// Requested date
        requested: NaiveDate,
        /// Last bookable date
        latest: NaiveDate,
    },

    /// Requested slot for today has already started
    #[error("The slot starting at {starts_at} has already started")]
    SlotAlreadyStarted {
        /// Slot start time
        starts_at: NaiveTime,
    },

    /// Too few participants for the room
    #[error("{participants} participant(s) is below {minimum_percentage}% of the room capacity {capacity}")]
    UnderOccupied {
        /// Distinct participants in the request
        participants: u32,
        /// Configured minimum occupancy percentage
        minimum_percentage: u32,
        /// Room capacity
        capacity: u32,
    },

    /// More participants than the room holds
    #[error("{participants} participant(s) exceed the room capacity {capacity}")]
    OverCapacity {
        /// Distinct participants in the request
        participants: u32,
        /// Room capacity
        capacity: u32,
    },

    /// Requester's reputation is below the booking threshold
    #[error("Reputation {score} is below the required {required}")]
    InsufficientReputation {
        /// Current score
        score: i32,
        /// Configured minimum
        required: i32,
    },

    /// Weekly booking quota used up
    #[error("Weekly booking quota reached ({used}/{limit})")]
    WeeklyQuotaExceeded {
        /// Bookings already counted this week
        used: u32,
        /// Configured limit
        limit: u32,
    },

    /// Daily booking quota used up
    #[error("Daily booking quota reached ({used}/{limit})")]
    DailyQuotaExceeded {
        /// Bookings already counted today
        used: u32,
        /// Configured limit
        limit: u32,
    },

    /// Room or slot is not open for booking
    #[error("Room ({}) or slot ({}) is not available for booking", .room.as_str(), .slot.as_str())]
    TargetUnavailable {
        /// Room status at validation time
        room: RoomStatus,
        /// Slot status at validation time
        slot: SlotStatus,
    },

    /// Room and slot are already taken on that date
    #[error("This room and slot are already booked for that date")]
    SlotAlreadyBooked,

    /// Cancellation requested after the cancellation deadline
    #[error("Bookings can only be cancelled until {deadline}")]
    CancellationWindowClosed {
        /// Last instant at which cancellation was accepted
        deadline: NaiveDateTime,
    },

    /// Only the booking owner may do this
    #[error("Only the booking owner may cancel it")]
    NotBookingOwner,

    /// Only a participant of the booking may do this
    #[error("Only participants of the booking may check in or out")]
    NotParticipant,

    /// Booking is not in a status that permits the operation
    #[error("Booking is {} and cannot be changed", .status.as_str())]
    BookingNotActive {
        /// Current status
        status: BookingStatus,
    },

    /// Check-in attempted before the slot starts
    #[error("Check-in opens at {opens_at}")]
    CheckInNotOpen {
        /// Slot start
        opens_at: NaiveDateTime,
    },

    /// Check-in attempted after the grace window
    #[error("Check-in closed at {deadline}")]
    CheckInWindowClosed {
        /// End of the check-in grace window
        deadline: NaiveDateTime,
    },
}

impl PolicyViolation {
    /// Stable machine-readable code for the request-handling layer
    pub fn code(&self) -> &'static str {
        match self {
            PolicyViolation::DatePast { .. } => "DatePastError",
            PolicyViolation::DateTooFar { .. } => "DateTooFarError",
            PolicyViolation::SlotAlreadyStarted { .. } => "SlotAlreadyStartedError",
            PolicyViolation::UnderOccupied { .. } => "UnderOccupiedError",
            PolicyViolation::OverCapacity { .. } => "OverCapacityError",
            PolicyViolation::InsufficientReputation { .. } => "InsufficientReputationError",
            PolicyViolation::WeeklyQuotaExceeded { .. } => "WeeklyQuotaExceededError",
            PolicyViolation::DailyQuotaExceeded { .. } => "DailyQuotaExceededError",
            PolicyViolation::TargetUnavailable { .. } => "TargetUnavailableError",
            PolicyViolation::SlotAlreadyBooked => "SlotAlreadyBookedError",
            PolicyViolation::CancellationWindowClosed { .. } => "CancellationWindowClosedError",
            PolicyViolation::NotBookingOwner => "NotBookingOwnerError",
            PolicyViolation::NotParticipant => "NotParticipantError",
            PolicyViolation::BookingNotActive { .. } => "BookingNotActiveError",
            PolicyViolation::CheckInNotOpen { .. } => "CheckInNotOpenError",
            PolicyViolation::CheckInWindowClosed { .. } => "CheckInWindowClosedError",
        }
    }
}
