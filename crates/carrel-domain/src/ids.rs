//! Identifiers for bookings, rooms, slots and users

use std::fmt;

/// Unique identifier for a booking based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which makes
/// "oldest first" listings cheap for the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingId(u128);

impl BookingId {
    /// Generate a new UUIDv7-based BookingId
    ///
    /// # Examples
    ///
    /// ```
    /// use carrel_domain::BookingId;
    ///
    /// let id = BookingId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a BookingId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a BookingId from its hyphenated UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use carrel_domain::BookingId;
    ///
    /// let id = BookingId::new();
    /// let parsed = BookingId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid booking id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl std::str::FromStr for BookingId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Room identifier, owned by the room-scheduling subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(pub i64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Slot identifier, owned by the room-scheduling subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub i64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Opaque user identity (student code)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identity string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_ordering() {
        let id1 = BookingId::from_value(1000);
        let id2 = BookingId::from_value(2000);

        assert!(id1 < id2);
    }

    #[test]
    fn test_booking_id_sortable_by_creation() {
        let first = BookingId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = BookingId::new();

        assert!(first < second);
    }

    #[test]
    fn test_booking_id_rejects_garbage() {
        assert!(BookingId::from_string("not-a-uuid").is_err());
        assert!("also bad".parse::<BookingId>().is_err());
    }

    #[test]
    fn test_user_id_display() {
        let user = UserId::from("s1234567");
        assert_eq!(user.to_string(), "s1234567");
        assert_eq!(user.as_str(), "s1234567");
    }
}
