//! Store error types

use carrel_domain::BookingStatus;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Booking with the same ID already stored
    #[error("Duplicate booking: {0}")]
    Duplicate(String),

    /// Transition not allowed by the booking lifecycle
    #[error("Invalid status transition from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        /// Observed status
        from: BookingStatus,
        /// Requested status
        to: BookingStatus,
    },

    /// A thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,
}
