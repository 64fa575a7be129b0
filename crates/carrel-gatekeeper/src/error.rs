//! Gatekeeper error types

use carrel_domain::{RoomId, SlotId};
use thiserror::Error;

/// Infrastructure failures during admission
///
/// Policy rejections are not errors; they come back as
/// [`AdmissionOutcome::Rejected`](crate::AdmissionOutcome::Rejected).
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Requested room does not exist
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Requested slot does not exist
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotId),

    /// Store error during lookup or persistence
    #[error("Store error: {0}")]
    Store(String),
}

impl GatekeeperError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatekeeperError::Store(_))
    }
}
