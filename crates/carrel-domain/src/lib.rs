//! Carrel Domain Layer
//!
//! Core model and policy vocabulary for library room booking. Every other
//! crate in the workspace depends on the types and trait interfaces defined
//! here; infrastructure implementations live elsewhere.
//!
//! ## Key Concepts
//!
//! - **Room / Slot**: bookable space and a named time-of-day interval
//! - **Booking**: a reservation of one slot in one room on one date
//! - **Booking status**: a one-directional lifecycle
//!   (pending → checked in → completed, or expired / cancelled)
//! - **Reputation**: per-user standing, decremented by violations
//! - **Policy violation**: an expected, user-facing rejection reason
//!
//! ## Architecture
//!
//! - Pure business logic only, no I/O
//! - Trait definitions for every external interaction (see [`traits`])
//! - Time is passed in explicitly or read through a [`clock::Clock`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod booking;
pub mod clock;
pub mod ids;
pub mod reputation;
pub mod room;
pub mod traits;
pub mod violation;

// Re-exports for convenience
pub use booking::{Booking, BookingRequest, BookingStatus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{BookingId, RoomId, SlotId, UserId};
pub use reputation::{ReputationPolicy, ReputationRecord, ViolationEvent, ViolationType};
pub use room::{Room, RoomStatus, Slot, SlotStatus};
pub use violation::PolicyViolation;
