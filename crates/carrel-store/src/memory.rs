//! In-process store

use crate::{check_transition, distinct_users, week_bounds, StoreError};
use carrel_domain::traits::{
    BookingCounts, BookingStore, ReputationLedger, RoomDirectory, Stamp, Transition,
};
use carrel_domain::{
    Booking, BookingId, BookingStatus, ReputationPolicy, ReputationRecord, Room, RoomId, Slot,
    SlotId, UserId, ViolationEvent, ViolationType,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    rooms: HashMap<RoomId, Room>,
    slots: HashMap<SlotId, Slot>,
    bookings: BTreeMap<BookingId, Booking>,
    ledger: HashMap<UserId, ReputationRecord>,
}

/// Store that keeps everything in memory behind one lock
///
/// Every operation takes the lock for its whole duration, which makes
/// transitions and ledger updates trivially atomic.
pub struct MemoryStore {
    policy: ReputationPolicy,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new(policy: ReputationPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Insert or replace a room
    pub fn upsert_room(&self, room: Room) -> Result<(), StoreError> {
        self.state()?.rooms.insert(room.id, room);
        Ok(())
    }

    /// Insert or replace a slot
    pub fn upsert_slot(&self, slot: Slot) -> Result<(), StoreError> {
        self.state()?.slots.insert(slot.id, slot);
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl RoomDirectory for MemoryStore {
    type Error = StoreError;

    fn get_room(&self, id: RoomId) -> Result<Option<Room>, Self::Error> {
        Ok(self.state()?.rooms.get(&id).cloned())
    }

    fn get_slot(&self, id: SlotId) -> Result<Option<Slot>, Self::Error> {
        Ok(self.state()?.slots.get(&id).cloned())
    }
}

impl BookingStore for MemoryStore {
    type Error = StoreError;

    fn create_booking(&self, booking: &Booking) -> Result<bool, Self::Error> {
        let mut state = self.state()?;

        if state.bookings.contains_key(&booking.id) {
            return Err(StoreError::Duplicate(booking.id.to_string()));
        }

        let held = state.bookings.values().any(|b| {
            b.room_id == booking.room_id
                && b.slot_id == booking.slot_id
                && b.booking_date == booking.booking_date
                && b.status.holds_slot()
        });
        if held {
            return Ok(false);
        }

        // Same participant set the SQLite backend reads back: sorted, distinct
        let mut stored = booking.clone();
        stored.participants = distinct_users(&booking.participants);
        state.bookings.insert(booking.id, stored);
        Ok(true)
    }

    fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, Self::Error> {
        Ok(self.state()?.bookings.get(&id).cloned())
    }

    fn list_bookings(
        &self,
        statuses: &[BookingStatus],
        date: NaiveDate,
    ) -> Result<Vec<Booking>, Self::Error> {
        let state = self.state()?;
        Ok(state
            .bookings
            .values()
            .filter(|b| statuses.contains(&b.status) && b.booking_date <= date)
            .cloned()
            .collect())
    }

    fn booking_counts(&self, user: &UserId, date: NaiveDate) -> Result<BookingCounts, Self::Error> {
        let state = self.state()?;
        let (monday, sunday) = week_bounds(date);

        let counted = state
            .bookings
            .values()
            .filter(|b| b.owner == *user && b.status != BookingStatus::Cancelled);

        let mut days = BTreeSet::new();
        let mut daily = 0;
        for booking in counted {
            if booking.booking_date >= monday && booking.booking_date <= sunday {
                days.insert(booking.booking_date);
            }
            if booking.booking_date == date {
                daily += 1;
            }
        }

        Ok(BookingCounts {
            weekly_days: days.len() as u32,
            daily,
        })
    }

    fn apply_transition(&self, transition: &Transition) -> Result<bool, Self::Error> {
        check_transition(transition)?;

        let mut state = self.state()?;
        let state = &mut *state;

        let booking = state
            .bookings
            .get_mut(&transition.booking_id)
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", transition.booking_id)))?;

        if booking.status != transition.from {
            return Ok(false);
        }

        booking.status = transition.to;
        match transition.stamp {
            Some(Stamp::CheckIn(at)) => booking.checked_in_at = Some(at),
            Some(Stamp::CheckOut(at)) => {
                booking.checked_out_at.get_or_insert(at);
            }
            None => {}
        }

        if let Some(penalty) = &transition.penalty {
            let event = penalty.event(transition.booking_id);
            for user in distinct_users(&penalty.users) {
                state
                    .ledger
                    .entry(user.clone())
                    .or_insert_with(|| ReputationRecord::new(user, &self.policy))
                    .penalize(event.clone(), &self.policy);
            }
        }

        Ok(true)
    }
}

impl ReputationLedger for MemoryStore {
    type Error = StoreError;

    fn penalize(
        &self,
        user: &UserId,
        amount: u32,
        kind: ViolationType,
        at: NaiveDateTime,
    ) -> Result<i32, Self::Error> {
        let mut state = self.state()?;
        let event = ViolationEvent {
            kind,
            occurred_at: at,
            penalty: amount,
            booking_id: None,
        };
        Ok(state
            .ledger
            .entry(user.clone())
            .or_insert_with(|| ReputationRecord::new(user.clone(), &self.policy))
            .penalize(event, &self.policy))
    }

    fn current_score(&self, user: &UserId) -> Result<i32, Self::Error> {
        let state = self.state()?;
        Ok(state
            .ledger
            .get(user)
            .map(|r| r.score)
            .unwrap_or(self.policy.baseline))
    }

    fn violations(&self, user: &UserId) -> Result<Vec<ViolationEvent>, Self::Error> {
        let state = self.state()?;
        Ok(state
            .ledger
            .get(user)
            .map(|r| r.violations.clone())
            .unwrap_or_default())
    }

    fn record(&self, user: &UserId) -> Result<ReputationRecord, Self::Error> {
        let state = self.state()?;
        Ok(state
            .ledger
            .get(user)
            .cloned()
            .unwrap_or_else(|| ReputationRecord::new(user.clone(), &self.policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_domain::traits::Penalty;
    use chrono::NaiveTime;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn booking(owner: &str, day: u32, slot: i64) -> Booking {
        Booking {
            id: BookingId::new(),
            booking_date: date(day),
            room_id: RoomId(1),
            slot_id: SlotId(slot),
            slot_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            slot_end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            owner: UserId::from(owner),
            participants: vec![UserId::from(owner), UserId::from("friend")],
            created_at: date(1).and_hms_opt(9, 0, 0).unwrap(),
            status: BookingStatus::Pending,
            checked_in_at: None,
            checked_out_at: None,
        }
    }

    #[test]
    fn test_create_rejects_held_slot() {
        let store = MemoryStore::new(ReputationPolicy::default());
        let first = booking("alice", 19, 1);
        assert!(store.create_booking(&first).unwrap());

        let second = booking("bob", 19, 1);
        assert!(!store.create_booking(&second).unwrap());

        // Same slot on another day is free
        assert!(store.create_booking(&booking("bob", 20, 1)).unwrap());
    }

    #[test]
    fn test_cancelled_booking_frees_slot() {
        let store = MemoryStore::new(ReputationPolicy::default());
        let first = booking("alice", 19, 1);
        store.create_booking(&first).unwrap();

        let cancel = Transition {
            booking_id: first.id,
            from: BookingStatus::Pending,
            to: BookingStatus::Cancelled,
            stamp: None,
            penalty: None,
        };
        assert!(store.apply_transition(&cancel).unwrap());
        assert!(store.create_booking(&booking("bob", 19, 1)).unwrap());
    }

    #[test]
    fn test_counts_by_week_and_day() {
        let store = MemoryStore::new(ReputationPolicy::default());
        // 2026-10-19 is a Monday
        store.create_booking(&booking("alice", 19, 1)).unwrap();
        store.create_booking(&booking("alice", 19, 2)).unwrap();
        store.create_booking(&booking("alice", 21, 1)).unwrap();
        store.create_booking(&booking("alice", 26, 1)).unwrap();
        store.create_booking(&booking("bob", 20, 1)).unwrap();

        let counts = store.booking_counts(&UserId::from("alice"), date(19)).unwrap();
        assert_eq!(counts, BookingCounts { weekly_days: 2, daily: 2 });

        let counts = store.booking_counts(&UserId::from("alice"), date(25)).unwrap();
        assert_eq!(counts, BookingCounts { weekly_days: 2, daily: 0 });
    }

    #[test]
    fn test_transition_is_compare_and_set() {
        let store = MemoryStore::new(ReputationPolicy::default());
        let b = booking("alice", 19, 1);
        store.create_booking(&b).unwrap();

        let expire = Transition {
            booking_id: b.id,
            from: BookingStatus::Pending,
            to: BookingStatus::Expired,
            stamp: None,
            penalty: Some(Penalty {
                users: b.participants.clone(),
                amount: 10,
                kind: ViolationType::Checkin,
                at: date(19).and_hms_opt(8, 20, 0).unwrap(),
            }),
        };

        assert!(store.apply_transition(&expire).unwrap());
        assert!(!store.apply_transition(&expire).unwrap());

        assert_eq!(store.current_score(&UserId::from("alice")).unwrap(), 90);
        assert_eq!(store.current_score(&UserId::from("friend")).unwrap(), 90);
        assert_eq!(store.violations(&UserId::from("alice")).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let store = MemoryStore::new(ReputationPolicy::default());
        let b = booking("alice", 19, 1);
        store.create_booking(&b).unwrap();

        let bad = Transition {
            booking_id: b.id,
            from: BookingStatus::Pending,
            to: BookingStatus::Completed,
            stamp: None,
            penalty: None,
        };
        assert!(matches!(
            store.apply_transition(&bad),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_ledger_defaults_to_baseline() {
        let store = MemoryStore::new(ReputationPolicy { baseline: 70, floor: 0 });
        let user = UserId::from("nobody");

        assert_eq!(store.current_score(&user).unwrap(), 70);
        assert!(store.violations(&user).unwrap().is_empty());
        assert_eq!(store.record(&user).unwrap().score, 70);

        let at = date(19).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(store.penalize(&user, 100, ViolationType::Checkout, at).unwrap(), 0);
    }
}
