//! SQLite-backed store

use crate::{check_transition, distinct_users, week_bounds, StoreError};
use carrel_domain::traits::{
    BookingCounts, BookingStore, ReputationLedger, RoomDirectory, Stamp, Transition,
};
use carrel_domain::{
    Booking, BookingId, BookingStatus, ReputationPolicy, ReputationRecord, Room, RoomId,
    RoomStatus, Slot, SlotId, SlotStatus, UserId, ViolationEvent, ViolationType,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const BOOKING_COLUMNS: &str = "id, booking_date, room_id, slot_id, slot_start, slot_end, owner, \
     created_at, status, checked_in_at, checked_out_at";

/// SQLite-based implementation of the booking, room and ledger contracts
///
/// The connection sits behind a mutex so the store can be shared between
/// the request path and the sweeper. Writes run in `IMMEDIATE`
/// transactions, which also serializes them against other processes using
/// the same database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    policy: ReputationPolicy,
}

impl SqliteStore {
    /// Open (or create) a store at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use carrel_domain::ReputationPolicy;
    /// use carrel_store::SqliteStore;
    ///
    /// let store = SqliteStore::new(":memory:", ReputationPolicy::default()).unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P, policy: ReputationPolicy) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;

        tracing::debug!("Booking store schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
            policy,
        })
    }

    /// Insert or replace a room
    pub fn upsert_room(&self, room: &Room) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO rooms (id, name, capacity, status) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, capacity = excluded.capacity, status = excluded.status",
            params![room.id.0, room.name, room.capacity, room.status.as_str()],
        )?;
        Ok(())
    }

    /// Insert or replace a slot
    pub fn upsert_slot(&self, slot: &Slot) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO slots (id, name, start_time, end_time, position, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, start_time = excluded.start_time,
                end_time = excluded.end_time, position = excluded.position,
                status = excluded.status",
            params![
                slot.id.0,
                slot.name,
                slot.start_time,
                slot.end_time,
                slot.order,
                slot.status.as_str()
            ],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Convert BookingId to bytes for storage
    fn booking_id_to_bytes(id: BookingId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to BookingId
    fn bytes_to_booking_id(bytes: &[u8]) -> Result<BookingId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for BookingId, got {}",
                bytes.len()
            ))
        })?;
        Ok(BookingId::from_value(u128::from_be_bytes(arr)))
    }

    fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_booking_id(&id_bytes)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Blob, Box::new(e)))?;

        let status: String = row.get(8)?;
        let status = BookingStatus::parse(&status)
            .ok_or_else(|| invalid_text(8, format!("Unknown booking status: {}", status)))?;

        Ok(Booking {
            id,
            booking_date: row.get(1)?,
            room_id: RoomId(row.get(2)?),
            slot_id: SlotId(row.get(3)?),
            slot_start: row.get(4)?,
            slot_end: row.get(5)?,
            owner: UserId::new(row.get::<_, String>(6)?),
            participants: Vec::new(),
            created_at: row.get(7)?,
            status,
            checked_in_at: row.get(9)?,
            checked_out_at: row.get(10)?,
        })
    }

    fn load_participants(conn: &Connection, booking: &mut Booking) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(
            "SELECT user_id FROM booking_participants WHERE booking_id = ?1 ORDER BY user_id",
        )?;
        booking.participants = stmt
            .query_map(params![Self::booking_id_to_bytes(booking.id)], |row| {
                row.get::<_, String>(0).map(UserId::new)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    fn score_in(&self, conn: &Connection, user: &UserId) -> Result<i32, StoreError> {
        let score = conn
            .query_row(
                "SELECT score FROM reputation WHERE user_id = ?1",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(score.unwrap_or(self.policy.baseline))
    }

    /// Record one violation and update the score inside an open transaction
    fn penalize_in(
        &self,
        conn: &Connection,
        user: &UserId,
        event: ViolationEvent,
    ) -> Result<i32, StoreError> {
        let mut record = ReputationRecord {
            user: user.clone(),
            score: self.score_in(conn, user)?,
            violations: Vec::new(),
        };

        conn.execute(
            "INSERT INTO violations (user_id, kind, occurred_at, penalty, booking_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.as_str(),
                event.kind.as_str(),
                event.occurred_at,
                event.penalty,
                event.booking_id.map(Self::booking_id_to_bytes)
            ],
        )?;

        let score = record.penalize(event, &self.policy);
        conn.execute(
            "INSERT INTO reputation (user_id, score) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET score = excluded.score",
            params![user.as_str(), score],
        )?;

        Ok(score)
    }

    fn violations_in(conn: &Connection, user: &UserId) -> Result<Vec<ViolationEvent>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT kind, occurred_at, penalty, booking_id FROM violations
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let events = stmt
            .query_map(params![user.as_str()], |row| {
                let kind: String = row.get(0)?;
                let kind = ViolationType::parse(&kind)
                    .ok_or_else(|| invalid_text(0, format!("Unknown violation type: {}", kind)))?;

                let booking_id = row
                    .get::<_, Option<Vec<u8>>>(3)?
                    .map(|bytes| Self::bytes_to_booking_id(&bytes))
                    .transpose()
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Blob, Box::new(e))
                    })?;

                Ok(ViolationEvent {
                    kind,
                    occurred_at: row.get(1)?,
                    penalty: row.get(2)?,
                    booking_id,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}

fn invalid_text(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        Box::new(StoreError::InvalidData(message)),
    )
}

impl RoomDirectory for SqliteStore {
    type Error = StoreError;

    fn get_room(&self, id: RoomId) -> Result<Option<Room>, Self::Error> {
        let conn = self.conn()?;
        let room = conn
            .query_row(
                "SELECT id, name, capacity, status FROM rooms WHERE id = ?1",
                params![id.0],
                |row| {
                    let status: String = row.get(3)?;
                    let status = RoomStatus::parse(&status)
                        .ok_or_else(|| invalid_text(3, format!("Unknown room status: {}", status)))?;
                    Ok(Room {
                        id: RoomId(row.get(0)?),
                        name: row.get(1)?,
                        capacity: row.get(2)?,
                        status,
                    })
                },
            )
            .optional()?;
        Ok(room)
    }

    fn get_slot(&self, id: SlotId) -> Result<Option<Slot>, Self::Error> {
        let conn = self.conn()?;
        let slot = conn
            .query_row(
                "SELECT id, name, start_time, end_time, position, status FROM slots WHERE id = ?1",
                params![id.0],
                |row| {
                    let status: String = row.get(5)?;
                    let status = SlotStatus::parse(&status)
                        .ok_or_else(|| invalid_text(5, format!("Unknown slot status: {}", status)))?;
                    Ok(Slot {
                        id: SlotId(row.get(0)?),
                        name: row.get(1)?,
                        start_time: row.get(2)?,
                        end_time: row.get(3)?,
                        order: row.get(4)?,
                        status,
                    })
                },
            )
            .optional()?;
        Ok(slot)
    }
}

impl BookingStore for SqliteStore {
    type Error = StoreError;

    fn create_booking(&self, booking: &Booking) -> Result<bool, Self::Error> {
        let id_bytes = Self::booking_id_to_bytes(booking.id);

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row("SELECT 1 FROM bookings WHERE id = ?1", params![&id_bytes], |_| Ok(()))
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::Duplicate(booking.id.to_string()));
        }

        let held = tx
            .query_row(
                "SELECT 1 FROM bookings
                 WHERE room_id = ?1 AND slot_id = ?2 AND booking_date = ?3
                   AND status IN ('pending', 'checked_in', 'completed')
                 LIMIT 1",
                params![booking.room_id.0, booking.slot_id.0, booking.booking_date],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if held {
            return Ok(false);
        }

        tx.execute(
            &format!(
                "INSERT INTO bookings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                BOOKING_COLUMNS
            ),
            params![
                &id_bytes,
                booking.booking_date,
                booking.room_id.0,
                booking.slot_id.0,
                booking.slot_start,
                booking.slot_end,
                booking.owner.as_str(),
                booking.created_at,
                booking.status.as_str(),
                booking.checked_in_at,
                booking.checked_out_at,
            ],
        )?;

        for user in &booking.participants {
            tx.execute(
                "INSERT OR IGNORE INTO booking_participants (booking_id, user_id) VALUES (?1, ?2)",
                params![&id_bytes, user.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, Self::Error> {
        let conn = self.conn()?;
        let booking = conn
            .query_row(
                &format!("SELECT {} FROM bookings WHERE id = ?1", BOOKING_COLUMNS),
                params![Self::booking_id_to_bytes(id)],
                Self::booking_from_row,
            )
            .optional()?;

        match booking {
            Some(mut booking) => {
                Self::load_participants(&conn, &mut booking)?;
                Ok(Some(booking))
            }
            None => Ok(None),
        }
    }

    fn list_bookings(
        &self,
        statuses: &[BookingStatus],
        date: NaiveDate,
    ) -> Result<Vec<Booking>, Self::Error> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM bookings WHERE booking_date <= ? AND status IN ({}) ORDER BY id",
            BOOKING_COLUMNS, placeholders
        );

        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(date)];
        for status in statuses {
            params.push(Box::new(status.as_str()));
        }
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut bookings = stmt
            .query_map(&param_refs[..], Self::booking_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for booking in &mut bookings {
            Self::load_participants(&conn, booking)?;
        }
        Ok(bookings)
    }

    fn booking_counts(&self, user: &UserId, date: NaiveDate) -> Result<BookingCounts, Self::Error> {
        let (monday, sunday) = week_bounds(date);
        let conn = self.conn()?;

        let weekly_days: u32 = conn.query_row(
            "SELECT COUNT(DISTINCT booking_date) FROM bookings
             WHERE owner = ?1 AND booking_date BETWEEN ?2 AND ?3 AND status != 'cancelled'",
            params![user.as_str(), monday, sunday],
            |row| row.get(0),
        )?;

        let daily: u32 = conn.query_row(
            "SELECT COUNT(*) FROM bookings
             WHERE owner = ?1 AND booking_date = ?2 AND status != 'cancelled'",
            params![user.as_str(), date],
            |row| row.get(0),
        )?;

        Ok(BookingCounts { weekly_days, daily })
    }

    fn apply_transition(&self, transition: &Transition) -> Result<bool, Self::Error> {
        check_transition(transition)?;

        let id_bytes = Self::booking_id_to_bytes(transition.booking_id);
        let (checked_in_at, checked_out_at): (Option<NaiveDateTime>, Option<NaiveDateTime>) =
            match transition.stamp {
                Some(Stamp::CheckIn(at)) => (Some(at), None),
                Some(Stamp::CheckOut(at)) => (None, Some(at)),
                None => (None, None),
            };

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx.execute(
            "UPDATE bookings SET
                status = ?1,
                checked_in_at = COALESCE(?2, checked_in_at),
                checked_out_at = COALESCE(checked_out_at, ?3)
             WHERE id = ?4 AND status = ?5",
            params![
                transition.to.as_str(),
                checked_in_at,
                checked_out_at,
                &id_bytes,
                transition.from.as_str()
            ],
        )?;

        if updated == 0 {
            let exists = tx
                .query_row("SELECT 1 FROM bookings WHERE id = ?1", params![&id_bytes], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Err(StoreError::NotFound(format!("booking {}", transition.booking_id)));
            }
            return Ok(false);
        }

        if let Some(penalty) = &transition.penalty {
            let event = penalty.event(transition.booking_id);
            for user in distinct_users(&penalty.users) {
                self.penalize_in(&tx, &user, event.clone())?;
            }
        }

        tx.commit()?;
        Ok(true)
    }
}

impl ReputationLedger for SqliteStore {
    type Error = StoreError;

    fn penalize(
        &self,
        user: &UserId,
        amount: u32,
        kind: ViolationType,
        at: NaiveDateTime,
    ) -> Result<i32, Self::Error> {
        let event = ViolationEvent {
            kind,
            occurred_at: at,
            penalty: amount,
            booking_id: None,
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let score = self.penalize_in(&tx, user, event)?;
        tx.commit()?;
        Ok(score)
    }

    fn current_score(&self, user: &UserId) -> Result<i32, Self::Error> {
        let conn = self.conn()?;
        self.score_in(&conn, user)
    }

    fn violations(&self, user: &UserId) -> Result<Vec<ViolationEvent>, Self::Error> {
        let conn = self.conn()?;
        Self::violations_in(&conn, user)
    }

    fn record(&self, user: &UserId) -> Result<ReputationRecord, Self::Error> {
        let conn = self.conn()?;
        Ok(ReputationRecord {
            user: user.clone(),
            score: self.score_in(&conn, user)?,
            violations: Self::violations_in(&conn, user)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn store() -> SqliteStore {
        let store = SqliteStore::new(":memory:", ReputationPolicy::default()).unwrap();
        store
            .upsert_room(&Room {
                id: RoomId(1),
                name: "Study Room A".to_string(),
                capacity: 4,
                status: RoomStatus::Active,
            })
            .unwrap();
        store
            .upsert_slot(&Slot {
                id: SlotId(1),
                name: "Morning 1".to_string(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                order: 1,
                status: SlotStatus::Active,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_booking_id_bytes_roundtrip() {
        let id = BookingId::new();
        let bytes = SqliteStore::booking_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_booking_id(&bytes).unwrap(), id);

        assert!(matches!(
            SqliteStore::bytes_to_booking_id(&[1, 2, 3]),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_upsert_room_replaces() {
        let store = store();
        store
            .upsert_room(&Room {
                id: RoomId(1),
                name: "Study Room A".to_string(),
                capacity: 6,
                status: RoomStatus::Maintenance,
            })
            .unwrap();

        let room = store.get_room(RoomId(1)).unwrap().unwrap();
        assert_eq!(room.capacity, 6);
        assert_eq!(room.status, RoomStatus::Maintenance);
        assert!(store.get_room(RoomId(99)).unwrap().is_none());
    }

    #[test]
    fn test_slot_times_roundtrip() {
        let store = store();
        let slot = store.get_slot(SlotId(1)).unwrap().unwrap();
        assert_eq!(slot.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(slot.end_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(slot.order, 1);
    }

    #[test]
    fn test_penalty_clamps_at_floor() {
        let store = store();
        let user = UserId::from("alice");
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(8, 20, 0)
            .unwrap();

        assert_eq!(store.penalize(&user, 60, ViolationType::Checkin, at).unwrap(), 40);
        assert_eq!(store.penalize(&user, 60, ViolationType::Checkout, at).unwrap(), 0);

        let record = store.record(&user).unwrap();
        assert_eq!(record.score, 0);
        assert_eq!(record.violations.len(), 2);
        assert_eq!(record.violations[0].kind, ViolationType::Checkin);
        assert_eq!(record.violations[1].kind, ViolationType::Checkout);
        assert_eq!(record.total_penalty(), 120);
    }
}
