//! Booking admission checks

use carrel_domain::traits::BookingCounts;
use carrel_domain::{BookingRequest, PolicyViolation, Room, Slot};
use carrel_rules::RuleConfig;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Requester standing supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// Current reputation score
    pub reputation: i32,

    /// Quota usage relative to the requested date
    pub counts: BookingCounts,
}

/// Outcome of validating a booking request
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionDecision {
    /// All checks passed
    Admitted,

    /// The first failing check
    Rejected(PolicyViolation),
}

impl AdmissionDecision {
    /// Whether the request passed
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted)
    }

    /// Rejection reason, if any
    pub fn reason(&self) -> Option<&PolicyViolation> {
        match self {
            AdmissionDecision::Admitted => None,
            AdmissionDecision::Rejected(reason) => Some(reason),
        }
    }
}

/// The Gatekeeper validates booking requests before they are persisted
pub struct Gatekeeper {
    rules: Arc<RuleConfig>,
}

impl Gatekeeper {
    /// Create a new Gatekeeper over a rule snapshot
    pub fn new(rules: Arc<RuleConfig>) -> Self {
        Self { rules }
    }

    /// Rules this gatekeeper enforces
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Validate a request against the rules
    ///
    /// Pure: every input is supplied by the caller and nothing is mutated.
    /// Checks short-circuit in order: dates, capacity, reputation, quotas,
    /// availability.
    pub fn validate(
        &self,
        request: &BookingRequest,
        slot: &Slot,
        room: &Room,
        standing: &Standing,
        now: NaiveDateTime,
    ) -> AdmissionDecision {
        match self.check_all(request, slot, room, standing, now) {
            Ok(()) => AdmissionDecision::Admitted,
            Err(reason) => AdmissionDecision::Rejected(reason),
        }
    }

    fn check_all(
        &self,
        request: &BookingRequest,
        slot: &Slot,
        room: &Room,
        standing: &Standing,
        now: NaiveDateTime,
    ) -> Result<(), PolicyViolation> {
        self.check_date(request, slot, now)?;
        self.check_capacity(request, room)?;
        self.check_reputation(standing)?;
        self.check_quotas(standing)?;
        self.check_availability(slot, room)
    }

    fn check_date(
        &self,
        request: &BookingRequest,
        slot: &Slot,
        now: NaiveDateTime,
    ) -> Result<(), PolicyViolation> {
        let today = now.date();
        let requested = request.booking_date;

        if requested < today {
            return Err(PolicyViolation::DatePast { requested, today });
        }

        // An unrepresentable horizon means nothing is too far
        if let Some(latest) = today.checked_add_signed(self.rules.booking_horizon()) {
            if requested > latest {
                return Err(PolicyViolation::DateTooFar { requested, latest });
            }
        }

        if requested == today && slot.start_time < now.time() {
            return Err(PolicyViolation::SlotAlreadyStarted {
                starts_at: slot.start_time,
            });
        }

        Ok(())
    }

    /// Lower bound compares `capacity * pct` against `participants * 100`
    /// in integers, so the exact threshold is admitted.
    fn check_capacity(&self, request: &BookingRequest, room: &Room) -> Result<(), PolicyViolation> {
        let participants = request.participant_count();
        let required = u64::from(room.capacity) * u64::from(self.rules.min_capacity_percentage);

        if required > u64::from(participants) * 100 {
            return Err(PolicyViolation::UnderOccupied {
                participants,
                minimum_percentage: self.rules.min_capacity_percentage,
                capacity: room.capacity,
            });
        }

        if participants > room.capacity {
            return Err(PolicyViolation::OverCapacity {
                participants,
                capacity: room.capacity,
            });
        }

        Ok(())
    }

    fn check_reputation(&self, standing: &Standing) -> Result<(), PolicyViolation> {
        if standing.reputation < self.rules.min_reputation_to_book {
            return Err(PolicyViolation::InsufficientReputation {
                score: standing.reputation,
                required: self.rules.min_reputation_to_book,
            });
        }
        Ok(())
    }

    /// The weekly quota counts distinct days, so a request for a day that
    /// already holds a booking adds nothing to it.
    fn check_quotas(&self, standing: &Standing) -> Result<(), PolicyViolation> {
        let weekly_limit = self.rules.max_weekly_booking_days;
        let adds_day = standing.counts.daily == 0;
        if adds_day && standing.counts.weekly_days >= weekly_limit {
            return Err(PolicyViolation::WeeklyQuotaExceeded {
                used: standing.counts.weekly_days,
                limit: weekly_limit,
            });
        }

        let daily_limit = self.rules.max_daily_bookings_per_student;
        if standing.counts.daily >= daily_limit {
            return Err(PolicyViolation::DailyQuotaExceeded {
                used: standing.counts.daily,
                limit: daily_limit,
            });
        }

        Ok(())
    }

    fn check_availability(&self, slot: &Slot, room: &Room) -> Result<(), PolicyViolation> {
        if !room.is_bookable() || !slot.is_bookable() {
            return Err(PolicyViolation::TargetUnavailable {
                room: room.status,
                slot: slot.status,
            });
        }
        Ok(())
    }
}
