//! Date and time formats used by the persisted ledger.
//!
//! Two distinct patterns are kept on disk: entry timestamps are sortable
//! `YYYY-MM-DD HH:MM:SS`, while birthdays keep the shorter `DD-MM-YY` pattern
//! exactly as the user typed it.

use crate::error::LedgerError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const BIRTHDAY_FORMAT: &str = "%d-%m-%y";

/// Serde adapter for `NaiveDateTime` fields in the `TIMESTAMP_FORMAT` pattern.
pub mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A birthday as entered during onboarding, stored verbatim.
///
/// Only the day and month matter for the countdown; the two-digit year is kept
/// so the stored text round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Birthday(String);

impl Birthday {
    /// Accepts text in the `DD-MM-YY` pattern, e.g. `"01-01-90"`.
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let trimmed = text.trim();
        NaiveDate::parse_from_str(trimmed, BIRTHDAY_FORMAT)
            .map_err(|_| LedgerError::InvalidBirthday(trimmed.to_string()))?;
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The stored day and month, or `None` if the stored text is malformed.
    pub fn day_month(&self) -> Option<(u32, u32)> {
        let date = NaiveDate::parse_from_str(&self.0, BIRTHDAY_FORMAT).ok()?;
        Some((date.day(), date.month()))
    }

    /// Whole days from `now` until the next occurrence of this birthday.
    ///
    /// Today counts as zero. A 29 February birthday counts down to the next
    /// leap year. Returns `None` if the stored text is malformed.
    pub fn days_until(&self, now: NaiveDateTime) -> Option<i64> {
        let (day, month) = self.day_month()?;
        let today = now.date();
        // A leap-day birthday may skip up to seven years across a century.
        (today.year()..=today.year() + 8)
            .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
            .find(|candidate| *candidate >= today)
            .map(|next| (next - today).num_days())
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
