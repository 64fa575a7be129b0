//! Sweep cycle: reclaim bookings whose grace windows have lapsed

use crate::{JanitorError, JanitorMetrics};
use carrel_domain::traits::{BookingStore, Penalty, Transition};
use carrel_domain::{Booking, BookingStatus, UserId, ViolationType};
use carrel_rules::RuleConfig;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Statuses the sweep looks at
const SWEPT_STATUSES: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::CheckedIn];

/// Lifecycle sweeper
///
/// Each cycle lists pending and checked-in bookings and moves every one
/// whose grace window has lapsed to its next status, penalizing the
/// participants when they never showed up or never checked out.
///
/// Transitions go through the store's compare-and-set, so re-running a
/// cycle over already-processed bookings is a no-op. Only one cycle runs at
/// a time per janitor.
///
/// # Examples
///
/// ```no_run
/// use carrel_janitor::Janitor;
/// use carrel_rules::RuleConfig;
/// use carrel_store::SqliteStore;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rules = Arc::new(RuleConfig::default());
/// let store = SqliteStore::new("carrel.db", rules.reputation_policy())?;
/// let janitor = Janitor::new(rules);
///
/// let now = chrono::Local::now().naive_local();
/// let metrics = janitor.run_sweep_cycle(&store, now)?;
/// println!("{}", metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    rules: Arc<RuleConfig>,
    dry_run: bool,
    running: AtomicBool,
    metrics: Mutex<JanitorMetrics>,
}

/// Clears the single-flight flag when a cycle ends, however it ends
struct SweepGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Janitor {
    /// Create a janitor over a rule snapshot
    pub fn new(rules: Arc<RuleConfig>) -> Self {
        Self {
            rules,
            dry_run: false,
            running: AtomicBool::new(false),
            metrics: Mutex::new(JanitorMetrics::new()),
        }
    }

    /// Log what would change without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rule snapshot in use
    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Whether this janitor only reports
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Cumulative metrics across all cycles
    pub fn metrics(&self) -> JanitorMetrics {
        self.metrics_lock().clone()
    }

    /// Reset metrics counters
    pub fn reset_metrics(&self) {
        self.metrics_lock().reset();
    }

    fn metrics_lock(&self) -> MutexGuard<'_, JanitorMetrics> {
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_begin_sweep(&self) -> Result<SweepGuard<'_>, JanitorError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| JanitorError::SweepInProgress)?;
        Ok(SweepGuard {
            running: &self.running,
        })
    }

    /// Run one sweep cycle at `now`
    ///
    /// Returns this cycle's metrics. Failures on individual bookings are
    /// logged and counted, and those bookings are retried next cycle; only a
    /// failure to list candidates fails the whole cycle.
    pub fn run_sweep_cycle<S: BookingStore>(
        &self,
        store: &S,
        now: NaiveDateTime,
    ) -> Result<JanitorMetrics, JanitorError> {
        self.run_sweep_cycle_until(store, now, || false)
    }

    /// Run one sweep cycle, stopping early between bookings once
    /// `should_stop` returns true
    pub fn run_sweep_cycle_until<S, F>(
        &self,
        store: &S,
        now: NaiveDateTime,
        should_stop: F,
    ) -> Result<JanitorMetrics, JanitorError>
    where
        S: BookingStore,
        F: Fn() -> bool,
    {
        let _guard = self.try_begin_sweep()?;
        let start = Instant::now();
        let mut cycle = JanitorMetrics::new();

        let candidates = store
            .list_bookings(&SWEPT_STATUSES, now.date())
            .map_err(|e| JanitorError::Store(format!("Failed to list bookings: {}", e)))?;

        tracing::debug!(candidates = candidates.len(), "Sweep cycle started");

        for (index, booking) in candidates.iter().enumerate() {
            if should_stop() {
                tracing::info!(
                    remaining = candidates.len() - index,
                    "Shutdown requested, leaving remaining bookings for the next cycle"
                );
                break;
            }

            let Some(transition) = self.plan_transition(booking, now) else {
                continue;
            };

            if self.dry_run {
                tracing::info!(
                    booking_id = %booking.id,
                    from = transition.from.as_str(),
                    to = transition.to.as_str(),
                    "DRY RUN: would transition booking"
                );
                cycle.record_planned();
                continue;
            }

            match store.apply_transition(&transition) {
                Ok(true) => Self::record_applied(&mut cycle, &transition),
                Ok(false) => {
                    tracing::debug!(
                        booking_id = %booking.id,
                        "Booking changed status before the sweep reached it"
                    );
                    cycle.record_skip();
                }
                Err(e) => {
                    tracing::warn!(
                        booking_id = %booking.id,
                        "Failed to transition booking, will retry next cycle: {}",
                        e
                    );
                    cycle.record_failure();
                }
            }
        }

        cycle.record_sweep(start.elapsed());
        self.metrics_lock().absorb(&cycle);

        Ok(cycle)
    }

    /// Transition the sweep would apply to `booking` at `now`, if any
    ///
    /// A booking is acted on only once `now` is strictly after its deadline.
    pub fn plan_transition(&self, booking: &Booking, now: NaiveDateTime) -> Option<Transition> {
        match booking.status {
            BookingStatus::Pending => {
                let deadline = booking.check_in_deadline(self.rules.check_in_grace());
                (now > deadline).then(|| Transition {
                    booking_id: booking.id,
                    from: BookingStatus::Pending,
                    to: BookingStatus::Expired,
                    stamp: None,
                    penalty: Some(self.penalty(booking, ViolationType::Checkin, now)),
                })
            }
            BookingStatus::CheckedIn => {
                let deadline = booking.check_out_deadline(self.rules.check_out_grace());
                if now <= deadline {
                    return None;
                }
                if booking.checked_out_at.is_some() {
                    return Some(Transition {
                        booking_id: booking.id,
                        from: BookingStatus::CheckedIn,
                        to: BookingStatus::Completed,
                        stamp: None,
                        penalty: None,
                    });
                }
                Some(Transition {
                    booking_id: booking.id,
                    from: BookingStatus::CheckedIn,
                    to: BookingStatus::Expired,
                    stamp: None,
                    penalty: Some(self.penalty(booking, ViolationType::Checkout, now)),
                })
            }
            _ => None,
        }
    }

    fn penalty(&self, booking: &Booking, kind: ViolationType, now: NaiveDateTime) -> Penalty {
        let mut users: Vec<UserId> = booking.participants.clone();
        users.push(booking.owner.clone());
        users.sort();
        users.dedup();

        Penalty {
            users,
            amount: self.rules.substract_reputation,
            kind,
            at: now,
        }
    }

    fn record_applied(cycle: &mut JanitorMetrics, transition: &Transition) {
        match &transition.penalty {
            Some(penalty) => {
                tracing::info!(
                    booking_id = %transition.booking_id,
                    status = transition.to.as_str(),
                    violation = penalty.kind.as_str(),
                    penalized = penalty.users.len(),
                    "Booking expired"
                );
                cycle.record_expiry(penalty.kind, penalty.users.len());
            }
            None => {
                tracing::info!(
                    booking_id = %transition.booking_id,
                    status = transition.to.as_str(),
                    "Booking completed"
                );
                cycle.record_completion();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_domain::traits::{BookingCounts, ReputationLedger};
    use carrel_domain::{BookingId, ReputationPolicy, RoomId, SlotId};
    use carrel_store::{MemoryStore, StoreError};
    use chrono::{NaiveDate, NaiveTime, TimeDelta};
    use std::cell::Cell;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: BookingId::new(),
            booking_date: at(0, 0).date(),
            room_id: RoomId(1),
            slot_id: SlotId(1),
            slot_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            slot_end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            owner: UserId::from("alice"),
            participants: vec![UserId::from("alice"), UserId::from("bob")],
            created_at: at(7, 0),
            status,
            checked_in_at: None,
            checked_out_at: None,
        }
    }

    fn janitor() -> Janitor {
        Janitor::new(Arc::new(RuleConfig::default()))
    }

    fn store_with(bookings: &[Booking]) -> MemoryStore {
        let store = MemoryStore::new(ReputationPolicy::default());
        for b in bookings {
            assert!(store.create_booking(b).unwrap());
        }
        store
    }

    /// Store that fails transitions for one booking
    struct FlakyStore {
        inner: MemoryStore,
        broken: BookingId,
    }

    impl BookingStore for FlakyStore {
        type Error = StoreError;

        fn create_booking(&self, booking: &Booking) -> Result<bool, Self::Error> {
            self.inner.create_booking(booking)
        }

        fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, Self::Error> {
            self.inner.get_booking(id)
        }

        fn list_bookings(
            &self,
            statuses: &[BookingStatus],
            date: chrono::NaiveDate,
        ) -> Result<Vec<Booking>, Self::Error> {
            self.inner.list_bookings(statuses, date)
        }

        fn booking_counts(&self, user: &UserId, date: chrono::NaiveDate) -> Result<BookingCounts, Self::Error> {
            self.inner.booking_counts(user, date)
        }

        fn apply_transition(&self, transition: &Transition) -> Result<bool, Self::Error> {
            if transition.booking_id == self.broken {
                return Err(StoreError::InvalidData("disk full".to_string()));
            }
            self.inner.apply_transition(transition)
        }
    }

    #[test]
    fn test_pending_not_acted_on_at_deadline() {
        let janitor = janitor();
        let b = booking(BookingStatus::Pending);

        assert!(janitor.plan_transition(&b, at(8, 15)).is_none());

        let transition = janitor.plan_transition(&b, at(8, 15) + TimeDelta::seconds(1)).unwrap();
        assert_eq!(transition.to, BookingStatus::Expired);
        let penalty = transition.penalty.unwrap();
        assert_eq!(penalty.kind, ViolationType::Checkin);
        assert_eq!(penalty.amount, 10);
        assert_eq!(penalty.users, vec![UserId::from("alice"), UserId::from("bob")]);
    }

    #[test]
    fn test_checked_in_plans() {
        let janitor = janitor();
        let mut b = booking(BookingStatus::CheckedIn);
        b.checked_in_at = Some(at(8, 5));

        assert!(janitor.plan_transition(&b, at(10, 15)).is_none());

        let expire = janitor.plan_transition(&b, at(10, 16)).unwrap();
        assert_eq!(expire.to, BookingStatus::Expired);
        assert_eq!(expire.penalty.unwrap().kind, ViolationType::Checkout);

        b.checked_out_at = Some(at(9, 50));
        let complete = janitor.plan_transition(&b, at(10, 16)).unwrap();
        assert_eq!(complete.to, BookingStatus::Completed);
        assert!(complete.penalty.is_none());
    }

    #[test]
    fn test_terminal_bookings_ignored() {
        let janitor = janitor();
        for status in [BookingStatus::Completed, BookingStatus::Cancelled, BookingStatus::Expired] {
            assert!(janitor.plan_transition(&booking(status), at(23, 0)).is_none());
        }
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let janitor = janitor();
        let b = booking(BookingStatus::Pending);
        let store = store_with(&[b.clone()]);

        let first = janitor.run_sweep_cycle(&store, at(9, 0)).unwrap();
        assert_eq!(first.expired_for(ViolationType::Checkin), 1);
        assert_eq!(first.penalties_applied, 2);

        let second = janitor.run_sweep_cycle(&store, at(9, 0)).unwrap();
        assert_eq!(second.total_expired(), 0);
        assert_eq!(second.penalties_applied, 0);

        assert_eq!(store.get_booking(b.id).unwrap().unwrap().status, BookingStatus::Expired);
        assert_eq!(store.current_score(&UserId::from("alice")).unwrap(), 90);
        assert_eq!(store.violations(&UserId::from("bob")).unwrap().len(), 1);

        let total = janitor.metrics();
        assert_eq!(total.sweep_count, 2);
        assert_eq!(total.total_expired(), 1);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let janitor = janitor().with_dry_run(true);
        let b = booking(BookingStatus::Pending);
        let store = store_with(&[b.clone()]);

        let metrics = janitor.run_sweep_cycle(&store, at(9, 0)).unwrap();
        assert_eq!(metrics.planned, 1);
        assert_eq!(metrics.total_expired(), 0);

        assert_eq!(store.get_booking(b.id).unwrap().unwrap().status, BookingStatus::Pending);
        assert_eq!(store.current_score(&UserId::from("alice")).unwrap(), 100);
    }

    #[test]
    fn test_failed_booking_does_not_stop_cycle() {
        let janitor = janitor();
        let broken = booking(BookingStatus::Pending);
        let mut healthy = booking(BookingStatus::Pending);
        healthy.slot_id = SlotId(2);

        let store = FlakyStore {
            inner: store_with(&[broken.clone(), healthy.clone()]),
            broken: broken.id,
        };

        let metrics = janitor.run_sweep_cycle(&store, at(9, 0)).unwrap();
        assert_eq!(metrics.failures, 1);
        assert_eq!(metrics.total_expired(), 1);

        let status = |id| store.get_booking(id).unwrap().unwrap().status;
        assert_eq!(status(broken.id), BookingStatus::Pending);
        assert_eq!(status(healthy.id), BookingStatus::Expired);
    }

    #[test]
    fn test_overlapping_sweep_refused() {
        let janitor = janitor();
        let store = store_with(&[]);

        let guard = janitor.try_begin_sweep().unwrap();
        assert!(matches!(
            janitor.run_sweep_cycle(&store, at(9, 0)),
            Err(JanitorError::SweepInProgress)
        ));

        drop(guard);
        assert!(janitor.run_sweep_cycle(&store, at(9, 0)).is_ok());
    }

    #[test]
    fn test_stop_between_bookings() {
        let janitor = janitor();
        let first = booking(BookingStatus::Pending);
        let mut second = booking(BookingStatus::Pending);
        second.slot_id = SlotId(2);
        let store = store_with(&[first, second]);

        let checks = Cell::new(0);
        let metrics = janitor
            .run_sweep_cycle_until(&store, at(9, 0), || {
                checks.set(checks.get() + 1);
                checks.get() > 1
            })
            .unwrap();

        assert_eq!(metrics.total_expired(), 1);
        let pending = store.list_bookings(&[BookingStatus::Pending], at(9, 0).date()).unwrap();
        assert_eq!(pending.len(), 1);
    }
}
