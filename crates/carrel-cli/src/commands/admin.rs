//! Administrative commands: rules, seed-room, seed-slot.

use crate::cli::{SeedRoomArgs, SeedSlotArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use carrel_domain::{Room, RoomId, Slot, SlotId};
use carrel_rules::RuleConfig;
use carrel_store::SqliteStore;

/// Print the effective rules as TOML.
pub fn execute_rules(rules: &RuleConfig) -> Result<()> {
    print!("{}", rules.to_toml_string()?);
    Ok(())
}

/// Execute the seed-room command.
pub fn execute_seed_room(args: SeedRoomArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.capacity == 0 {
        return Err(CliError::InvalidInput("Room capacity must be at least 1".to_string()));
    }

    let room = Room {
        id: RoomId(args.id),
        name: args.name,
        capacity: args.capacity,
        status: args.status,
    };
    store.upsert_room(&room)?;

    println!(
        "{}",
        formatter.success(&format!("Saved {} '{}' ({})", room.id, room.name, room.status.as_str()))
    );
    Ok(())
}

/// Execute the seed-slot command.
pub fn execute_seed_slot(args: SeedSlotArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.end <= args.start {
        return Err(CliError::InvalidInput(format!(
            "Slot must end after it starts ({} - {})",
            args.start, args.end
        )));
    }

    let slot = Slot {
        id: SlotId(args.id),
        name: args.name,
        start_time: args.start,
        end_time: args.end,
        order: args.order,
        status: args.status,
    };
    store.upsert_slot(&slot)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Saved {} '{}' {} - {}",
            slot.id, slot.name, slot.start_time, slot.end_time
        ))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_need_no_database() {
        execute_rules(&RuleConfig::default()).unwrap();
    }

    #[test]
    fn test_seed_slot_rejects_inverted_times() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("carrel.db"), Default::default()).unwrap();
        let formatter = Formatter::new(crate::cli::CliFormat::Table, false);

        let args = SeedSlotArgs {
            id: 1,
            name: "Backwards".to_string(),
            start: crate::cli::parse_time("10:00").unwrap(),
            end: crate::cli::parse_time("08:00").unwrap(),
            order: 0,
            status: carrel_domain::SlotStatus::Active,
        };
        let err = execute_seed_slot(args, &store, &formatter).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
