//! Error types for loading rules

use thiserror::Error;

/// Errors that can occur while loading or checking a rule snapshot
#[derive(Error, Debug)]
pub enum RuleError {
    /// Failed to read the rules file
    #[error("Failed to read rules file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse rules TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to render TOML
    #[error("Failed to render rules TOML: {0}")]
    TomlRender(#[from] toml::ser::Error),

    /// Values parse but contradict each other
    #[error("Invalid rule configuration: {0}")]
    Invalid(String),
}
