//! Error types for the CLI application.

use carrel_domain::PolicyViolation;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Rule file could not be loaded
    #[error("Rules error: {0}")]
    Rules(#[from] carrel_rules::RuleError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] carrel_store::StoreError),

    /// Admission failed for infrastructure reasons
    #[error("Admission error: {0}")]
    Admission(#[from] carrel_gatekeeper::GatekeeperError),

    /// Sweep or worker failure
    #[error("Janitor error: {0}")]
    Janitor(#[from] carrel_janitor::JanitorError),

    /// Lifecycle request failed
    #[error("{0}")]
    Lifecycle(#[from] carrel_janitor::LifecycleError),

    /// Booking request refused by policy
    #[error("{} ({})", .0, .0.code())]
    Rejected(PolicyViolation),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_shows_code() {
        let err = CliError::Rejected(PolicyViolation::SlotAlreadyBooked);
        assert!(err.to_string().ends_with("(SlotAlreadyBookedError)"));
    }

    #[test]
    fn test_missing_rule_file_is_a_rules_error() {
        let err: CliError = carrel_rules::RuleConfig::from_file("/nonexistent/rules.toml")
            .unwrap_err()
            .into();
        assert!(matches!(err, CliError::Rules(_)));
        assert!(err.to_string().starts_with("Rules error:"));
    }
}
