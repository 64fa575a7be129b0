//! Synchronous lifecycle operations: cancel, check in, check out

use crate::{Janitor, LifecycleError};
use carrel_domain::traits::{BookingStore, Stamp, Transition};
use carrel_domain::{Booking, BookingId, BookingStatus, PolicyViolation, UserId};
use chrono::NaiveDateTime;

impl Janitor {
    /// Cancel a pending booking on behalf of its owner
    ///
    /// Accepted up to and including `slot start - CancelTimeInterval`.
    pub fn cancel<S: BookingStore>(
        &self,
        store: &S,
        booking_id: BookingId,
        requester: &UserId,
        now: NaiveDateTime,
    ) -> Result<Booking, LifecycleError> {
        let booking = load(store, booking_id)?;

        if booking.owner != *requester {
            return Err(PolicyViolation::NotBookingOwner.into());
        }
        require_status(&booking, BookingStatus::Pending)?;

        let deadline = booking.starts_at() - self.rules().cancel_lead_time();
        if now > deadline {
            return Err(PolicyViolation::CancellationWindowClosed { deadline }.into());
        }

        let booking = transition(store, booking, BookingStatus::Cancelled, None)?;
        tracing::info!(booking_id = %booking.id, user = %requester, "Booking cancelled");
        Ok(booking)
    }

    /// Check a participant in
    ///
    /// Accepted from slot start through slot start + `MaxTimeToCheckin`.
    pub fn check_in<S: BookingStore>(
        &self,
        store: &S,
        booking_id: BookingId,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<Booking, LifecycleError> {
        let booking = load(store, booking_id)?;

        if !booking.is_participant(user) {
            return Err(PolicyViolation::NotParticipant.into());
        }
        require_status(&booking, BookingStatus::Pending)?;

        let opens_at = booking.starts_at();
        if now < opens_at {
            return Err(PolicyViolation::CheckInNotOpen { opens_at }.into());
        }
        let deadline = booking.check_in_deadline(self.rules().check_in_grace());
        if now > deadline {
            return Err(PolicyViolation::CheckInWindowClosed { deadline }.into());
        }

        let booking = transition(store, booking, BookingStatus::CheckedIn, Some(Stamp::CheckIn(now)))?;
        tracing::info!(booking_id = %booking.id, user = %user, "Booking checked in");
        Ok(booking)
    }

    /// Check a participant out, completing the booking
    pub fn check_out<S: BookingStore>(
        &self,
        store: &S,
        booking_id: BookingId,
        user: &UserId,
        now: NaiveDateTime,
    ) -> Result<Booking, LifecycleError> {
        let booking = load(store, booking_id)?;

        if !booking.is_participant(user) {
            return Err(PolicyViolation::NotParticipant.into());
        }
        require_status(&booking, BookingStatus::CheckedIn)?;

        let booking = transition(store, booking, BookingStatus::Completed, Some(Stamp::CheckOut(now)))?;
        tracing::info!(booking_id = %booking.id, user = %user, "Booking checked out");
        Ok(booking)
    }
}

fn load<S: BookingStore>(store: &S, id: BookingId) -> Result<Booking, LifecycleError> {
    store
        .get_booking(id)
        .map_err(|e| LifecycleError::Store(format!("Failed to load booking: {}", e)))?
        .ok_or(LifecycleError::NotFound(id))
}

fn require_status(booking: &Booking, expected: BookingStatus) -> Result<(), PolicyViolation> {
    if booking.status != expected {
        return Err(PolicyViolation::BookingNotActive {
            status: booking.status,
        });
    }
    Ok(())
}

/// Apply `booking.status -> to` and return the updated booking
fn transition<S: BookingStore>(
    store: &S,
    mut booking: Booking,
    to: BookingStatus,
    stamp: Option<Stamp>,
) -> Result<Booking, LifecycleError> {
    let change = Transition {
        booking_id: booking.id,
        from: booking.status,
        to,
        stamp,
        penalty: None,
    };

    let applied = store
        .apply_transition(&change)
        .map_err(|e| LifecycleError::Store(format!("Failed to update booking: {}", e)))?;
    if !applied {
        return Err(LifecycleError::Conflict(booking.id));
    }

    booking.status = to;
    match stamp {
        Some(Stamp::CheckIn(at)) => booking.checked_in_at = Some(at),
        Some(Stamp::CheckOut(at)) => {
            booking.checked_out_at.get_or_insert(at);
        }
        None => {}
    }
    Ok(booking)
}
