//! Error types for Janitor operations

use carrel_domain::{BookingId, PolicyViolation};
use thiserror::Error;

/// Errors that can occur during sweep cycles and worker operation
///
/// Every variant is transient: the worker logs it and tries again on the
/// next tick.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),

    /// Another sweep cycle is still running on this janitor
    #[error("A sweep cycle is already in progress")]
    SweepInProgress,
}

/// Errors from the synchronous lifecycle operations (cancel, check-in, check-out)
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The request broke a booking rule; surface it to the user
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    /// No booking with this ID
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// The booking changed status while the request was being handled
    #[error("Booking {0} was modified concurrently")]
    Conflict(BookingId),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),
}

impl LifecycleError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LifecycleError::Conflict(_) | LifecycleError::Store(_))
    }

    /// The policy violation, if this is a rejection rather than a failure
    pub fn violation(&self) -> Option<&PolicyViolation> {
        match self {
            LifecycleError::Policy(violation) => Some(violation),
            _ => None,
        }
    }
}
