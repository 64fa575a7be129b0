//! CLI command definitions and argument parsing.

use carrel_domain::{BookingId, RoomStatus, SlotStatus};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Carrel - library room booking policy engine.
#[derive(Debug, Parser)]
#[command(name = "carrel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Rule file (TOML); built-in defaults when omitted
    #[arg(short, long, env = "CARREL_RULES", global = true)]
    pub rules: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "CARREL_DB", default_value = "carrel.db", global = true)]
    pub db: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable tables
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the lifecycle sweeper until Ctrl+C
    Run(RunArgs),

    /// Run a single sweep cycle
    Sweep(SweepArgs),

    /// Print the effective rules as TOML
    Rules,

    /// Show a user's reputation and violations
    Reputation(ReputationArgs),

    /// Request a booking
    Book(BookArgs),

    /// Cancel a pending booking
    Cancel(LifecycleArgs),

    /// Check in to a booking
    CheckIn(LifecycleArgs),

    /// Check out of a booking
    CheckOut(LifecycleArgs),

    /// Insert or update a room
    SeedRoom(SeedRoomArgs),

    /// Insert or update a slot
    SeedSlot(SeedSlotArgs),
}

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the sweep command.
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Sweep as of this local time instead of now
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<NaiveDateTime>,

    /// Log what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the reputation command.
#[derive(Debug, Args)]
pub struct ReputationArgs {
    /// Student code
    pub user: String,
}

/// Arguments for the book command.
#[derive(Debug, Args)]
pub struct BookArgs {
    /// Booking date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Room ID
    #[arg(long)]
    pub room: i64,

    /// Slot ID
    #[arg(long)]
    pub slot: i64,

    /// Requesting student
    #[arg(short, long)]
    pub user: String,

    /// Other participants
    #[arg(short = 'w', long = "with", value_delimiter = ',')]
    pub participants: Vec<String>,

    /// Request time instead of now
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<NaiveDateTime>,
}

/// Arguments for cancel, check-in and check-out.
#[derive(Debug, Args)]
pub struct LifecycleArgs {
    /// Booking ID
    pub booking: BookingId,

    /// Student making the request
    #[arg(short, long)]
    pub user: String,

    /// Request time instead of now
    #[arg(long, value_parser = parse_datetime)]
    pub at: Option<NaiveDateTime>,
}

/// Arguments for the seed-room command.
#[derive(Debug, Args)]
pub struct SeedRoomArgs {
    /// Room ID
    pub id: i64,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Maximum occupants
    #[arg(long)]
    pub capacity: u32,

    /// Status (pending, active, maintenance, inactive)
    #[arg(long, default_value = "active")]
    pub status: RoomStatus,
}

/// Arguments for the seed-slot command.
#[derive(Debug, Args)]
pub struct SeedSlotArgs {
    /// Slot ID
    pub id: i64,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub start: NaiveTime,

    /// End time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub end: NaiveTime,

    /// Position within the day
    #[arg(long, default_value_t = 0)]
    pub order: u32,

    /// Status (pending, active, inactive, maintenance_only)
    #[arg(long, default_value = "active")]
    pub status: SlotStatus,
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a local date-time such as `2026-10-19T14:05`
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Invalid date-time '{}', expected YYYY-MM-DDTHH:MM[:SS]", s))
}

/// Parse a time of day such as `08:00`
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| format!("Invalid time '{}', expected HH:MM[:SS]", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(parse_datetime("2026-10-19T14:05").unwrap(), expected);
        assert_eq!(parse_datetime("2026-10-19 14:05:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("08:00").unwrap(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(parse_time("08:00:30").unwrap(), NaiveTime::from_hms_opt(8, 0, 30).unwrap());
        assert!(parse_time("8am").is_err());
    }

    #[test]
    fn test_parse_book_command() {
        let cli = Cli::try_parse_from([
            "carrel", "book", "--date", "2026-10-20", "--room", "1", "--slot", "2", "--user",
            "alice", "--with", "bob,carol",
        ])
        .unwrap();

        assert_eq!(cli.db, PathBuf::from("carrel.db"));
        match cli.command {
            Command::Book(args) => {
                assert_eq!(args.participants, vec!["bob", "carol"]);
                assert_eq!(args.room, 1);
                assert!(args.at.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_lifecycle_command() {
        let id = BookingId::new();
        let cli = Cli::try_parse_from([
            "carrel",
            "--db",
            "/tmp/test.db",
            "cancel",
            id.to_string().as_str(),
            "--user",
            "alice",
            "--at",
            "2026-10-19T13:30",
        ])
        .unwrap();

        match cli.command {
            Command::Cancel(args) => {
                assert_eq!(args.booking, id);
                assert_eq!(args.user, "alice");
                assert!(args.at.is_some());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
