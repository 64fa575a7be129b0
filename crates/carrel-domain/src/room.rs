//! Rooms and slots - the bookable targets
//!
//! Both are owned by the room-scheduling subsystem and are read-only to the
//! booking engine.

use crate::{RoomId, SlotId};
use chrono::NaiveTime;

/// Lifecycle status of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomStatus {
    /// Created but not yet opened for booking
    Pending,

    /// Open for booking
    Active,

    /// Temporarily closed for maintenance
    Maintenance,

    /// Retired
    Inactive,
}

impl RoomStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Pending => "pending",
            RoomStatus::Active => "active",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Inactive => "inactive",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(RoomStatus::Pending),
            "active" => Some(RoomStatus::Active),
            "maintenance" => Some(RoomStatus::Maintenance),
            "inactive" => Some(RoomStatus::Inactive),
            _ => None,
        }
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid room status: {}", s))
    }
}

/// Lifecycle status of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// Created but not yet opened for booking
    Pending,

    /// Open for booking
    Active,

    /// Retired
    Inactive,

    /// Reserved for maintenance work, not bookable by students
    MaintenanceOnly,
}

impl SlotStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "pending",
            SlotStatus::Active => "active",
            SlotStatus::Inactive => "inactive",
            SlotStatus::MaintenanceOnly => "maintenance_only",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(SlotStatus::Pending),
            "active" => Some(SlotStatus::Active),
            "inactive" => Some(SlotStatus::Inactive),
            "maintenance_only" => Some(SlotStatus::MaintenanceOnly),
            _ => None,
        }
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid slot status: {}", s))
    }
}

/// A bookable room
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Identifier
    pub id: RoomId,

    /// Display name
    pub name: String,

    /// Maximum number of occupants
    pub capacity: u32,

    /// Current lifecycle status
    pub status: RoomStatus,
}

impl Room {
    /// Whether students may book this room
    pub fn is_bookable(&self) -> bool {
        self.status == RoomStatus::Active
    }
}

/// A named time-of-day interval, shared by all rooms
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Identifier
    pub id: SlotId,

    /// Display name (e.g. "Morning 1")
    pub name: String,

    /// Start time of day
    pub start_time: NaiveTime,

    /// End time of day
    pub end_time: NaiveTime,

    /// Ordinal position within the day
    pub order: u32,

    /// Current lifecycle status
    pub status: SlotStatus,
}

impl Slot {
    /// Whether students may book this slot
    pub fn is_bookable(&self) -> bool {
        self.status == SlotStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_roundtrip() {
        for status in [
            RoomStatus::Pending,
            RoomStatus::Active,
            RoomStatus::Maintenance,
            RoomStatus::Inactive,
        ] {
            assert_eq!(RoomStatus::parse(status.as_str()), Some(status));
        }
        assert!("closed".parse::<RoomStatus>().is_err());
    }

    #[test]
    fn test_slot_status_parse_is_case_insensitive() {
        assert_eq!(SlotStatus::parse("MAINTENANCE_ONLY"), Some(SlotStatus::MaintenanceOnly));
        assert_eq!(SlotStatus::parse("Active"), Some(SlotStatus::Active));
        assert_eq!(SlotStatus::parse("soon"), None);
    }

    #[test]
    fn test_only_active_targets_are_bookable() {
        let mut room = Room {
            id: RoomId(1),
            name: "Group Study A".to_string(),
            capacity: 8,
            status: RoomStatus::Active,
        };
        assert!(room.is_bookable());
        room.status = RoomStatus::Maintenance;
        assert!(!room.is_bookable());

        let mut slot = Slot {
            id: SlotId(1),
            name: "Morning 1".to_string(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            order: 1,
            status: SlotStatus::Active,
        };
        assert!(slot.is_bookable());
        slot.status = SlotStatus::MaintenanceOnly;
        assert!(!slot.is_bookable());
    }
}
