//! Admission flow: fetch inputs, validate, persist

use crate::{AdmissionDecision, Gatekeeper, GatekeeperError, Standing};
use carrel_domain::traits::{BookingStore, ReputationLedger, RoomDirectory};
use carrel_domain::{Booking, BookingRequest, PolicyViolation};
use chrono::NaiveDateTime;

/// Result of submitting a booking request
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    /// Request admitted and persisted as a pending booking
    Admitted(Booking),

    /// Request refused
    Rejected(PolicyViolation),
}

impl Gatekeeper {
    /// Validate a request and persist it if admitted
    ///
    /// Looks up the room, slot, reputation and quota counts from `store`,
    /// runs [`validate`](Self::validate), and creates a pending booking.
    /// A room and slot already held on that date is rejected with
    /// [`PolicyViolation::SlotAlreadyBooked`].
    pub fn submit<S>(
        &self,
        request: &BookingRequest,
        now: NaiveDateTime,
        store: &S,
    ) -> Result<AdmissionOutcome, GatekeeperError>
    where
        S: BookingStore + RoomDirectory + ReputationLedger,
    {
        let room = store
            .get_room(request.room_id)
            .map_err(|e| GatekeeperError::Store(format!("Failed to load room: {}", e)))?
            .ok_or(GatekeeperError::RoomNotFound(request.room_id))?;

        let slot = store
            .get_slot(request.slot_id)
            .map_err(|e| GatekeeperError::Store(format!("Failed to load slot: {}", e)))?
            .ok_or(GatekeeperError::SlotNotFound(request.slot_id))?;

        let reputation = store
            .current_score(&request.requester)
            .map_err(|e| GatekeeperError::Store(format!("Failed to read reputation: {}", e)))?;

        let counts = store
            .booking_counts(&request.requester, request.booking_date)
            .map_err(|e| GatekeeperError::Store(format!("Failed to count bookings: {}", e)))?;

        let standing = Standing { reputation, counts };

        if let AdmissionDecision::Rejected(reason) =
            self.validate(request, &slot, &room, &standing, now)
        {
            tracing::debug!(
                requester = %request.requester,
                code = reason.code(),
                "Booking request rejected: {}",
                reason
            );
            return Ok(AdmissionOutcome::Rejected(reason));
        }

        let booking = Booking::from_request(request, &slot, now);
        let created = store
            .create_booking(&booking)
            .map_err(|e| GatekeeperError::Store(format!("Failed to create booking: {}", e)))?;

        if !created {
            tracing::debug!(
                requester = %request.requester,
                room = %request.room_id,
                slot = %request.slot_id,
                "Booking request rejected: slot already held"
            );
            return Ok(AdmissionOutcome::Rejected(PolicyViolation::SlotAlreadyBooked));
        }

        tracing::info!(
            booking_id = %booking.id,
            requester = %booking.owner,
            date = %booking.booking_date,
            "Booking admitted"
        );

        Ok(AdmissionOutcome::Admitted(booking))
    }
}
