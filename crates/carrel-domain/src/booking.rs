//! Booking module - reservations and their lifecycle

use crate::{BookingId, RoomId, Slot, SlotId, UserId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::BTreeSet;

/// Status of a booking in its lifecycle
///
/// Transitions are one-directional:
/// - Pending → CheckedIn, Cancelled, Expired
/// - CheckedIn → Completed, Expired
///
/// Completed, Cancelled and Expired are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Admitted, waiting for check-in
    Pending,

    /// Holder checked in, waiting for check-out
    CheckedIn,

    /// Holder checked out
    Completed,

    /// Cancelled by the owner before the cancellation deadline
    Cancelled,

    /// Abandoned: a check-in or check-out grace window elapsed
    Expired,
}

impl BookingStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Expired => "expired",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "expired" => Some(BookingStatus::Expired),
            _ => None,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Expired
        )
    }

    /// Whether a booking in this status still occupies its room and slot
    pub fn holds_slot(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::CheckedIn | BookingStatus::Completed
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::CheckedIn)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Pending, BookingStatus::Expired)
                | (BookingStatus::CheckedIn, BookingStatus::Completed)
                | (BookingStatus::CheckedIn, BookingStatus::Expired)
        )
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid booking status: {}", s))
    }
}

/// A booking request as submitted by a student
///
/// Transient: consumed by the gatekeeper, never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    /// Requested calendar date
    pub booking_date: NaiveDate,

    /// Target room
    pub room_id: RoomId,

    /// Target slot
    pub slot_id: SlotId,

    /// Student submitting the request (becomes the booking owner)
    pub requester: UserId,

    /// Everyone who will use the room
    pub participants: Vec<UserId>,
}

impl BookingRequest {
    /// Distinct participants, always including the requester
    pub fn distinct_participants(&self) -> Vec<UserId> {
        let mut set: BTreeSet<UserId> = self.participants.iter().cloned().collect();
        set.insert(self.requester.clone());
        set.into_iter().collect()
    }

    /// Number of distinct occupants the request would bring
    pub fn participant_count(&self) -> u32 {
        self.distinct_participants().len() as u32
    }
}

/// A persisted booking
///
/// The slot's start and end times are captured at admission so the
/// lifecycle sweep can compute grace deadlines without a slot lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Unique identifier
    pub id: BookingId,

    /// Calendar date of the reservation
    pub booking_date: NaiveDate,

    /// Reserved room
    pub room_id: RoomId,

    /// Reserved slot
    pub slot_id: SlotId,

    /// Slot start time at admission
    pub slot_start: NaiveTime,

    /// Slot end time at admission
    pub slot_end: NaiveTime,

    /// Student who made the booking
    pub owner: UserId,

    /// Distinct occupants, owner included
    pub participants: Vec<UserId>,

    /// When the booking was admitted
    pub created_at: NaiveDateTime,

    /// Current lifecycle status
    pub status: BookingStatus,

    /// When the holder checked in
    pub checked_in_at: Option<NaiveDateTime>,

    /// When the holder checked out
    pub checked_out_at: Option<NaiveDateTime>,
}

impl Booking {
    /// Build a new pending booking from an admitted request
    pub fn from_request(request: &BookingRequest, slot: &Slot, now: NaiveDateTime) -> Self {
        Self {
            id: BookingId::new(),
            booking_date: request.booking_date,
            room_id: request.room_id,
            slot_id: request.slot_id,
            slot_start: slot.start_time,
            slot_end: slot.end_time,
            owner: request.requester.clone(),
            participants: request.distinct_participants(),
            created_at: now,
            status: BookingStatus::Pending,
            checked_in_at: None,
            checked_out_at: None,
        }
    }

    /// Date-time at which the reserved slot starts
    pub fn starts_at(&self) -> NaiveDateTime {
        self.booking_date.and_time(self.slot_start)
    }

    /// Date-time at which the reserved slot ends
    pub fn ends_at(&self) -> NaiveDateTime {
        self.booking_date.and_time(self.slot_end)
    }

    /// Last instant at which check-in is still accepted
    pub fn check_in_deadline(&self, grace: TimeDelta) -> NaiveDateTime {
        self.starts_at() + grace
    }

    /// Last instant at which check-out is still expected
    pub fn check_out_deadline(&self, grace: TimeDelta) -> NaiveDateTime {
        self.ends_at() + grace
    }

    /// Whether `user` is one of the occupants
    pub fn is_participant(&self, user: &UserId) -> bool {
        self.owner == *user || self.participants.contains(user)
    }
}
