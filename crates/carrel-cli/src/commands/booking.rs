//! Booking commands: book, cancel, check-in, check-out.

use super::resolve_now;
use crate::cli::{BookArgs, LifecycleArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use carrel_domain::{BookingRequest, RoomId, SlotId, UserId};
use carrel_gatekeeper::{AdmissionOutcome, Gatekeeper};
use carrel_janitor::Janitor;
use carrel_store::SqliteStore;

/// Execute the book command.
pub fn execute_book(
    args: BookArgs,
    gatekeeper: &Gatekeeper,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let requester = UserId::new(args.user);
    let mut participants: Vec<UserId> = args.participants.into_iter().map(UserId::new).collect();
    if !participants.contains(&requester) {
        participants.insert(0, requester.clone());
    }

    let request = BookingRequest {
        booking_date: args.date,
        room_id: RoomId(args.room),
        slot_id: SlotId(args.slot),
        requester,
        participants,
    };

    match gatekeeper.submit(&request, resolve_now(args.at), store)? {
        AdmissionOutcome::Admitted(booking) => {
            println!("{}", formatter.success("Booking admitted"));
            println!("{}", formatter.booking(&booking)?);
            Ok(())
        }
        AdmissionOutcome::Rejected(reason) => {
            eprintln!("{}", formatter.rejection(&reason)?);
            Err(CliError::Rejected(reason))
        }
    }
}

/// Execute the cancel command.
pub fn execute_cancel(
    args: LifecycleArgs,
    janitor: &Janitor,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let user = UserId::new(args.user);
    let booking = janitor.cancel(store, args.booking, &user, resolve_now(args.at))?;
    println!("{}", formatter.success("Booking cancelled"));
    println!("{}", formatter.booking(&booking)?);
    Ok(())
}

/// Execute the check-in command.
pub fn execute_check_in(
    args: LifecycleArgs,
    janitor: &Janitor,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let user = UserId::new(args.user);
    let booking = janitor.check_in(store, args.booking, &user, resolve_now(args.at))?;
    println!("{}", formatter.success("Checked in"));
    println!("{}", formatter.booking(&booking)?);
    Ok(())
}

/// Execute the check-out command.
pub fn execute_check_out(
    args: LifecycleArgs,
    janitor: &Janitor,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let user = UserId::new(args.user);
    let booking = janitor.check_out(store, args.booking, &user, resolve_now(args.at))?;
    println!("{}", formatter.success("Checked out"));
    println!("{}", formatter.booking(&booking)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliFormat;
    use carrel_domain::traits::BookingStore;
    use carrel_domain::{BookingStatus, PolicyViolation, Room, RoomStatus, Slot, SlotStatus};
    use carrel_rules::RuleConfig;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::sync::Arc;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn setup(dir: &tempfile::TempDir) -> (Arc<RuleConfig>, SqliteStore) {
        let rules = Arc::new(RuleConfig::default());
        let store = SqliteStore::new(dir.path().join("carrel.db"), rules.reputation_policy()).unwrap();
        store
            .upsert_room(&Room {
                id: RoomId(1),
                name: "Group Study 1".to_string(),
                capacity: 4,
                status: RoomStatus::Active,
            })
            .unwrap();
        store
            .upsert_slot(&Slot {
                id: SlotId(1),
                name: "Morning".to_string(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                order: 1,
                status: SlotStatus::Active,
            })
            .unwrap();
        (rules, store)
    }

    fn book_args(user: &str) -> BookArgs {
        BookArgs {
            date: at(20, 0, 0).date(),
            room: 1,
            slot: 1,
            user: user.to_string(),
            participants: vec!["bob".to_string()],
            at: Some(at(19, 9, 0)),
        }
    }

    #[test]
    fn test_book_then_reject_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let (rules, store) = setup(&dir);
        let gatekeeper = Gatekeeper::new(rules);
        let formatter = Formatter::new(CliFormat::Json, false);

        execute_book(book_args("alice"), &gatekeeper, &store, &formatter).unwrap();

        let pending = store
            .list_bookings(&[BookingStatus::Pending], at(20, 0, 0).date())
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].owner, UserId::from("alice"));
        assert!(pending[0].is_participant(&UserId::from("bob")));

        let err = execute_book(book_args("carol"), &gatekeeper, &store, &formatter).unwrap_err();
        assert!(matches!(err, CliError::Rejected(PolicyViolation::SlotAlreadyBooked)));
    }

    #[test]
    fn test_cancel_by_non_owner_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (rules, store) = setup(&dir);
        let gatekeeper = Gatekeeper::new(Arc::clone(&rules));
        let janitor = Janitor::new(rules);
        let formatter = Formatter::new(CliFormat::Table, false);

        execute_book(book_args("alice"), &gatekeeper, &store, &formatter).unwrap();
        let booking = store
            .list_bookings(&[BookingStatus::Pending], at(20, 0, 0).date())
            .unwrap()
            .remove(0);

        let args = LifecycleArgs {
            booking: booking.id,
            user: "bob".to_string(),
            at: Some(at(19, 12, 0)),
        };
        let err = execute_cancel(args, &janitor, &store, &formatter).unwrap_err();
        assert!(err.to_string().contains("owner"));

        let args = LifecycleArgs {
            booking: booking.id,
            user: "alice".to_string(),
            at: Some(at(19, 12, 0)),
        };
        execute_cancel(args, &janitor, &store, &formatter).unwrap();
        assert_eq!(
            store.get_booking(booking.id).unwrap().unwrap().status,
            BookingStatus::Cancelled
        );
    }
}
