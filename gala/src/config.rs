//! Configuration management for the gala.
//!
//! Loads configuration from environment variables with defaults matching the
//! reference venue: 15 student tables, 10 staff tables, 8 seats each, gala on
//! 2022-01-01 with the simulated current date 15 days earlier.

use crate::calendar::EventClock;
use crate::engine::ReservationPolicy;
use crate::tables::VenueLayout;
use crate::types::Category;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Days between the default current date and the event date
const DEFAULT_LEAD_DAYS: u64 = 15;

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A table pool has no tables
    #[error("The {0} table pool must have at least one table")]
    EmptyPool(Category),

    /// Tables have no seats
    #[error("Table capacity must be at least 1")]
    ZeroCapacity,

    /// The two pools together exceed the table limit
    #[error("At most {max} tables are supported")]
    TooManyTables {
        /// Largest supported number of tables
        max: u32,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalaConfig {
    /// Snapshot file location
    pub snapshot_path: PathBuf,
    /// Roster files
    pub roster: RosterConfig,
    /// Event calendar
    pub calendar: CalendarConfig,
    /// Table layout
    pub venue: VenueConfig,
    /// Time-based rules
    pub policy: PolicyConfig,
}

/// Roster file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Tab-separated student roster
    pub students: PathBuf,
    /// Tab-separated staff roster
    pub staff: PathBuf,
}

/// Event calendar configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Date of the gala
    pub event_date: NaiveDate,
    /// Simulated current date on fresh initialization
    pub current_date: NaiveDate,
}

/// Table layout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Number of student tables
    pub student_tables: u32,
    /// Number of staff tables
    pub staff_tables: u32,
    /// Seats per table
    pub table_capacity: u32,
}

/// Time-based rules configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Cancellation cutoff in days before the event
    pub cancellation_cutoff_days: u32,
    /// Confirmation window in days before the event
    pub confirmation_window_days: u32,
}

impl GalaConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_layout = VenueLayout::DEFAULT;
        let default_policy = ReservationPolicy::DEFAULT;
        let event_date = parse_var(&lookup, "GALA_EVENT_DATE").unwrap_or_else(default_event_date);
        let current_date = parse_var(&lookup, "GALA_CURRENT_DATE").unwrap_or_else(|| {
            event_date
                .checked_sub_days(Days::new(DEFAULT_LEAD_DAYS))
                .unwrap_or(event_date)
        });

        Self {
            snapshot_path: lookup("GALA_SNAPSHOT_PATH")
                .map_or_else(|| PathBuf::from("gala.snapshot"), PathBuf::from),
            roster: RosterConfig {
                students: lookup("GALA_STUDENT_ROSTER")
                    .map_or_else(|| PathBuf::from("data/students.tsv"), PathBuf::from),
                staff: lookup("GALA_STAFF_ROSTER")
                    .map_or_else(|| PathBuf::from("data/staff.tsv"), PathBuf::from),
            },
            calendar: CalendarConfig {
                event_date,
                current_date,
            },
            venue: VenueConfig {
                student_tables: parse_var(&lookup, "GALA_STUDENT_TABLES")
                    .unwrap_or(default_layout.student_tables),
                staff_tables: parse_var(&lookup, "GALA_STAFF_TABLES")
                    .unwrap_or(default_layout.staff_tables),
                table_capacity: parse_var(&lookup, "GALA_TABLE_CAPACITY")
                    .unwrap_or(default_layout.table_capacity),
            },
            policy: PolicyConfig {
                cancellation_cutoff_days: parse_var(&lookup, "GALA_CANCELLATION_CUTOFF_DAYS")
                    .unwrap_or(default_policy.cancellation_cutoff_days),
                confirmation_window_days: parse_var(&lookup, "GALA_CONFIRMATION_WINDOW_DAYS")
                    .unwrap_or(default_policy.confirmation_window_days),
            },
        }
    }

    /// Check the values can describe a usable venue
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyPool`]: zero student or staff tables
    /// - [`ConfigError::ZeroCapacity`]: zero seats per table
    /// - [`ConfigError::TooManyTables`]: more than [`VenueLayout::MAX_TABLES`] tables
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.venue.student_tables == 0 {
            return Err(ConfigError::EmptyPool(Category::Student));
        }
        if self.venue.staff_tables == 0 {
            return Err(ConfigError::EmptyPool(Category::Staff));
        }
        if self.venue.table_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.layout().checked_total().is_none() {
            return Err(ConfigError::TooManyTables {
                max: VenueLayout::MAX_TABLES,
            });
        }
        Ok(())
    }

    /// Table layout described by this configuration
    #[must_use]
    pub const fn layout(&self) -> VenueLayout {
        VenueLayout {
            student_tables: self.venue.student_tables,
            staff_tables: self.venue.staff_tables,
            table_capacity: self.venue.table_capacity,
        }
    }

    /// Time-based rules described by this configuration
    #[must_use]
    pub const fn reservation_policy(&self) -> ReservationPolicy {
        ReservationPolicy {
            cancellation_cutoff_days: self.policy.cancellation_cutoff_days,
            confirmation_window_days: self.policy.confirmation_window_days,
        }
    }

    /// Event calendar for a fresh start
    #[must_use]
    pub const fn event_clock(&self) -> EventClock {
        EventClock::new(self.calendar.event_date, self.calendar.current_date)
    }
}

impl Default for GalaConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_event_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value = %value, "Ignoring unparseable configuration value");
    }
    parsed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> GalaConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GalaConfig::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = GalaConfig::default();

        assert_eq!(config.snapshot_path, PathBuf::from("gala.snapshot"));
        assert_eq!(config.roster.students, PathBuf::from("data/students.tsv"));
        assert_eq!(config.layout(), VenueLayout::DEFAULT);
        assert_eq!(config.reservation_policy(), ReservationPolicy::DEFAULT);
        assert_eq!(config.event_clock().days_until_event(), 15);
        assert_eq!(
            config.calendar.event_date,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_and_fallbacks() {
        let config = config(&[
            ("GALA_EVENT_DATE", "2026-06-20"),
            ("GALA_STUDENT_TABLES", "4"),
            ("GALA_TABLE_CAPACITY", "ten"),
            ("GALA_SNAPSHOT_PATH", "/var/lib/gala/state.bin"),
        ]);

        assert_eq!(config.venue.student_tables, 4);
        assert_eq!(config.venue.table_capacity, 8);
        assert_eq!(config.snapshot_path, PathBuf::from("/var/lib/gala/state.bin"));
        assert_eq!(
            config.calendar.current_date,
            NaiveDate::from_ymd_opt(2026, 6, 5).unwrap()
        );
    }

    #[test]
    fn explicit_current_date() {
        let config = config(&[("GALA_CURRENT_DATE", "2021-11-01")]);
        assert_eq!(config.event_clock().days_until_event(), 61);
    }

    #[test]
    fn validate_rejects_empty_venue() {
        assert_eq!(
            config(&[("GALA_STAFF_TABLES", "0")]).validate(),
            Err(ConfigError::EmptyPool(Category::Staff))
        );
        assert_eq!(
            config(&[("GALA_TABLE_CAPACITY", "0")]).validate(),
            Err(ConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn validate_rejects_oversized_venue() {
        let max = VenueLayout::MAX_TABLES;
        assert_eq!(
            config(&[("GALA_STUDENT_TABLES", "4294967295")]).validate(),
            Err(ConfigError::TooManyTables { max })
        );
        assert_eq!(
            config(&[("GALA_STUDENT_TABLES", "9991"), ("GALA_STAFF_TABLES", "10")]).validate(),
            Err(ConfigError::TooManyTables { max })
        );
        assert!(config(&[("GALA_STUDENT_TABLES", "9990")]).validate().is_ok());
    }
}
