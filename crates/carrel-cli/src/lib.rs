//! Carrel CLI library.
//!
//! Argument parsing, command execution and output formatting for the
//! `carrel` binary. Every command opens the SQLite store named by `--db`
//! and reads policy from the `--rules` file.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
