//! Rule snapshot and typed accessors

use crate::RuleError;
use carrel_domain::ReputationPolicy;
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Booking policy thresholds
///
/// Loaded once; share it behind an `Arc` rather than mutating it.
///
/// # Examples
///
/// ```
/// use carrel_rules::RuleConfig;
///
/// let rules = RuleConfig::default();
/// assert_eq!(rules.max_interval_day_to_book, 7);
/// assert_eq!(rules.sweep_interval(), std::time::Duration::from_secs(5 * 60));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase", deny_unknown_fields)]
pub struct RuleConfig {
    /// How many days ahead of today a booking may be made
    pub max_interval_day_to_book: u32,

    /// Distinct days per week on which a student may hold bookings
    pub max_weekly_booking_days: u32,

    /// Bookings per student per day
    pub max_daily_bookings_per_student: u32,

    /// Reputation needed to make a booking
    pub min_reputation_to_book: i32,

    /// Minimum occupancy as a percentage of room capacity
    pub min_capacity_percentage: u32,

    /// Check-in grace after slot start (minutes)
    pub max_time_to_checkin: u32,

    /// Check-out grace after slot end (minutes)
    pub max_time_to_checkout: u32,

    /// Reputation subtracted per participant for an abandoned booking
    pub substract_reputation: u32,

    /// First hour of day in which the sweeper acts
    pub time_start: u32,

    /// Hour of day from which the sweeper stops acting
    pub time_end: u32,

    /// Minutes between sweep cycles
    pub time_job_interval: u32,

    /// Minutes before slot start after which cancellation is refused
    pub cancel_time_interval: u32,

    /// Starting score for users without a ledger record
    pub base_reputation: i32,

    /// Lowest reachable score
    pub reputation_floor: i32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_interval_day_to_book: 7,
            max_weekly_booking_days: 3,
            max_daily_bookings_per_student: 2,
            min_reputation_to_book: 60,
            min_capacity_percentage: 50,
            max_time_to_checkin: 15,
            max_time_to_checkout: 15,
            substract_reputation: 10,
            time_start: 7,
            time_end: 22,
            time_job_interval: 5,
            cancel_time_interval: 30,
            base_reputation: 100,
            reputation_floor: 0,
        }
    }
}

impl RuleConfig {
    /// Load and validate rules from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate rules from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, RuleError> {
        let rules: RuleConfig = toml::from_str(contents)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Render the snapshot as TOML
    pub fn to_toml_string(&self) -> Result<String, RuleError> {
        Ok(toml::to_string(self)?)
    }

    /// Reject snapshots whose values contradict each other
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.min_capacity_percentage > 100 {
            return Err(RuleError::Invalid(format!(
                "MinCapacityPercentage must be at most 100, got {}",
                self.min_capacity_percentage
            )));
        }
        if self.time_end > 24 {
            return Err(RuleError::Invalid(format!(
                "TimeEnd must be an hour between 0 and 24, got {}",
                self.time_end
            )));
        }
        if self.time_start >= self.time_end {
            return Err(RuleError::Invalid(format!(
                "TimeStart ({}) must be before TimeEnd ({})",
                self.time_start, self.time_end
            )));
        }
        if self.time_job_interval == 0 {
            return Err(RuleError::Invalid("TimeJobInterval must be at least 1 minute".to_string()));
        }
        if self.reputation_floor > self.base_reputation {
            return Err(RuleError::Invalid(format!(
                "ReputationFloor ({}) must not exceed BaseReputation ({})",
                self.reputation_floor, self.base_reputation
            )));
        }
        Ok(())
    }

    /// Advance-booking horizon
    pub fn booking_horizon(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.max_interval_day_to_book))
    }

    /// Grace after slot start before a pending booking is abandoned
    pub fn check_in_grace(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.max_time_to_checkin))
    }

    /// Grace after slot end before a checked-in booking is abandoned
    pub fn check_out_grace(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.max_time_to_checkout))
    }

    /// How long before slot start cancellation closes
    pub fn cancel_lead_time(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.cancel_time_interval))
    }

    /// Time between sweep cycles
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_job_interval) * 60)
    }

    /// Whether `now` falls inside the sweeper's operating hours
    ///
    /// `TimeStart` is inclusive, `TimeEnd` exclusive.
    pub fn is_within_operating_hours(&self, now: NaiveDateTime) -> bool {
        let hour = now.hour();
        hour >= self.time_start && hour < self.time_end
    }

    /// Baseline and floor for the reputation ledger
    pub fn reputation_policy(&self) -> ReputationPolicy {
        ReputationPolicy {
            baseline: self.base_reputation,
            floor: self.reputation_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let rules = RuleConfig::default();
        assert_eq!(rules.max_interval_day_to_book, 7);
        assert_eq!(rules.max_weekly_booking_days, 3);
        assert_eq!(rules.max_daily_bookings_per_student, 2);
        assert_eq!(rules.min_reputation_to_book, 60);
        assert_eq!(rules.min_capacity_percentage, 50);
        assert_eq!(rules.max_time_to_checkin, 15);
        assert_eq!(rules.substract_reputation, 10);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_parse_recognized_option_names() {
        let toml = r#"
            MaxIntervalDayToBook = 14
            MaxWeeklyBookingDays = 4
            MaxDailyBookingsPerStudent = 1
            MinReputationToBook = 70
            MinCapacityPercentage = 25
            MaxTimeToCheckin = 10
            MaxTimeToCheckout = 20
            SubstractReputation = 5
            TimeStart = 6
            TimeEnd = 23
            TimeJobInterval = 2
            CancelTimeInterval = 60
        "#;

        let rules = RuleConfig::from_toml_str(toml).unwrap();
        assert_eq!(rules.max_interval_day_to_book, 14);
        assert_eq!(rules.max_weekly_booking_days, 4);
        assert_eq!(rules.max_daily_bookings_per_student, 1);
        assert_eq!(rules.min_reputation_to_book, 70);
        assert_eq!(rules.min_capacity_percentage, 25);
        assert_eq!(rules.max_time_to_checkin, 10);
        assert_eq!(rules.max_time_to_checkout, 20);
        assert_eq!(rules.substract_reputation, 5);
        assert_eq!(rules.time_start, 6);
        assert_eq!(rules.time_end, 23);
        assert_eq!(rules.time_job_interval, 2);
        assert_eq!(rules.cancel_time_interval, 60);
        // Unspecified keys keep their defaults
        assert_eq!(rules.base_reputation, 100);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RuleConfig::from_toml_str("MaxTimeToCheckIn = 10").unwrap_err();
        assert!(matches!(err, RuleError::TomlParse(_)));
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = RuleConfig::from_toml_str("MaxWeeklyBookingDays = -1").unwrap_err();
        assert!(matches!(err, RuleError::TomlParse(_)));
    }

    #[test]
    fn test_validate_rejects_inconsistent_values() {
        let cases = [
            "MinCapacityPercentage = 120",
            "TimeStart = 22\nTimeEnd = 7",
            "TimeEnd = 25",
            "TimeJobInterval = 0",
            "BaseReputation = 10\nReputationFloor = 20",
        ];
        for toml in cases {
            let err = RuleConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, RuleError::Invalid(_)), "accepted: {toml}");
        }
    }

    #[test]
    fn test_duration_conversions() {
        let rules = RuleConfig::default();

        assert_eq!(rules.booking_horizon(), TimeDelta::days(7));
        assert_eq!(rules.check_in_grace(), TimeDelta::minutes(15));
        assert_eq!(rules.check_out_grace(), TimeDelta::minutes(15));
        assert_eq!(rules.cancel_lead_time(), TimeDelta::minutes(30));
        assert_eq!(rules.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_operating_hours_bounds() {
        let rules = RuleConfig::default();

        assert!(!rules.is_within_operating_hours(at(6, 59)));
        assert!(rules.is_within_operating_hours(at(7, 0)));
        assert!(rules.is_within_operating_hours(at(21, 59)));
        assert!(!rules.is_within_operating_hours(at(22, 0)));
    }

    #[test]
    fn test_reputation_policy() {
        let rules = RuleConfig {
            base_reputation: 80,
            reputation_floor: -10,
            ..Default::default()
        };
        let policy = rules.reputation_policy();
        assert_eq!(policy.baseline, 80);
        assert_eq!(policy.floor, -10);
    }

    #[test]
    fn test_toml_roundtrip() {
        let rules = RuleConfig {
            max_time_to_checkin: 12,
            ..Default::default()
        };
        let rendered = rules.to_toml_string().unwrap();
        assert!(rendered.contains("MaxTimeToCheckin = 12"));

        let parsed = RuleConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn test_serde_json_uses_option_names() {
        let json = serde_json::to_value(RuleConfig::default()).unwrap();
        assert_eq!(json["CancelTimeInterval"], 30);
        assert_eq!(json["SubstractReputation"], 10);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MaxIntervalDayToBook = 3").unwrap();

        let rules = RuleConfig::from_file(file.path()).unwrap();
        assert_eq!(rules.max_interval_day_to_book, 3);

        let missing = RuleConfig::from_file("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(missing, RuleError::FileRead(_)));
    }
}
