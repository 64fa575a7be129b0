//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use carrel_domain::{Booking, BookingStatus, PolicyViolation, ReputationRecord};
use carrel_janitor::JanitorMetrics;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a booking.
    pub fn booking(&self, booking: &Booking) -> Result<String> {
        if self.format == CliFormat::Json {
            let participants: Vec<&str> = booking.participants.iter().map(|u| u.as_str()).collect();
            let value = serde_json::json!({
                "id": booking.id.to_string(),
                "date": booking.booking_date.to_string(),
                "room": booking.room_id.0,
                "slot": booking.slot_id.0,
                "starts_at": booking.starts_at().to_string(),
                "ends_at": booking.ends_at().to_string(),
                "owner": booking.owner.as_str(),
                "participants": participants,
                "status": booking.status.as_str(),
                "checked_in_at": booking.checked_in_at.map(|t| t.to_string()),
                "checked_out_at": booking.checked_out_at.map(|t| t.to_string()),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let participants: Vec<&str> = booking.participants.iter().map(|u| u.as_str()).collect();
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["ID".to_string(), booking.id.to_string()]);
        builder.push_record(["Date".to_string(), booking.booking_date.to_string()]);
        builder.push_record(["Room".to_string(), booking.room_id.to_string()]);
        builder.push_record([
            "Slot".to_string(),
            format!("{} ({} - {})", booking.slot_id, booking.slot_start, booking.slot_end),
        ]);
        builder.push_record(["Owner".to_string(), booking.owner.to_string()]);
        builder.push_record(["Participants".to_string(), participants.join(", ")]);
        builder.push_record(["Status".to_string(), self.status(booking.status)]);

        Ok(self.table(builder))
    }

    /// Format a reputation record with its violations.
    pub fn reputation(&self, record: &ReputationRecord) -> Result<String> {
        if self.format == CliFormat::Json {
            let violations: Vec<serde_json::Value> = record
                .violations
                .iter()
                .map(|v| {
                    serde_json::json!({
                        "type": v.kind.as_str(),
                        "occurred_at": v.occurred_at.to_string(),
                        "penalty": v.penalty,
                        "booking_id": v.booking_id.map(|id| id.to_string()),
                    })
                })
                .collect();
            let value = serde_json::json!({
                "user": record.user.as_str(),
                "score": record.score,
                "violations": violations,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let header = format!("{}: reputation {}", record.user, record.score);
        if record.violations.is_empty() {
            return Ok(format!("{}\n{}", header, self.colorize("No violations recorded.", "green")));
        }

        let mut builder = Builder::default();
        builder.push_record(["Type", "When", "Penalty", "Booking"]);
        for v in &record.violations {
            builder.push_record([
                v.kind.as_str().to_string(),
                v.occurred_at.to_string(),
                v.penalty.to_string(),
                v.booking_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            ]);
        }

        Ok(format!("{}\n{}", header, self.table(builder)))
    }

    /// Format the metrics of a sweep cycle.
    pub fn metrics(&self, metrics: &JanitorMetrics) -> Result<String> {
        if self.format == CliFormat::Json {
            let value = serde_json::json!({
                "expired_checkin": metrics.expired_for(carrel_domain::ViolationType::Checkin),
                "expired_checkout": metrics.expired_for(carrel_domain::ViolationType::Checkout),
                "completed": metrics.completed,
                "penalties_applied": metrics.penalties_applied,
                "skipped": metrics.skipped,
                "planned": metrics.planned,
                "failures": metrics.failures,
                "runtime_ms": metrics.total_runtime.as_millis() as u64,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }
        Ok(metrics.summary())
    }

    /// Format a policy rejection.
    pub fn rejection(&self, violation: &PolicyViolation) -> Result<String> {
        if self.format == CliFormat::Json {
            let value = serde_json::json!({
                "rejected": violation.code(),
                "message": violation.to_string(),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }
        Ok(self.error(&format!("{} [{}]", violation, violation.code())))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    fn status(&self, status: BookingStatus) -> String {
        let color = match status {
            BookingStatus::Pending => "yellow",
            BookingStatus::CheckedIn => "blue",
            BookingStatus::Completed => "green",
            BookingStatus::Cancelled | BookingStatus::Expired => "red",
        };
        self.colorize(status.as_str(), color)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
