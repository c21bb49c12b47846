//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Binaries read the environment; the core never does.

use crate::constants::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::{ContactsError, ContactsResult};
use chrono::{
    DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Time zone in which calendar-day filter boundaries are interpreted.
///
/// Records carry UTC timestamps while date filters are plain calendar days. The boundary
/// decides which instant "the start of 2026-02-11" refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateBoundary {
    #[default]
    Utc,
    /// The time zone of the host running the process.
    Local,
    Fixed(FixedOffset),
}

impl DateBoundary {
    /// First instant of `date` in this boundary zone.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.to_utc(date.and_time(NaiveTime::MIN))
    }

    /// First instant of the day after `date`; the inclusive end-of-day bound is everything
    /// strictly before it.
    pub fn start_of_next_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.checked_add_days(Days::new(1)) {
            Some(next) => self.start_of_day(next),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Wall-clock time of `instant` in this boundary zone.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            DateBoundary::Utc => instant.naive_utc(),
            DateBoundary::Local => instant.with_timezone(&Local).naive_local(),
            DateBoundary::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Calendar day of `instant` in this boundary zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    fn to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            DateBoundary::Utc => Utc.from_utc_datetime(&naive),
            // Midnight can fall in a DST gap; fall back to reading it as UTC.
            DateBoundary::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
            DateBoundary::Fixed(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }
}

impl FromStr for DateBoundary {
    type Err = ContactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("utc") || value == "Z" {
            return Ok(DateBoundary::Utc);
        }
        if value.eq_ignore_ascii_case("local") {
            return Ok(DateBoundary::Local);
        }

        let invalid = || ContactsError::InvalidDateBoundary(value.to_string());

        let (sign, rest) = match value.as_bytes().first() {
            Some(b'+') => (1, &value[1..]),
            Some(b'-') => (-1, &value[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DateBoundary::Fixed)
            .ok_or_else(invalid)
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    date_boundary: DateBoundary,
    default_per_page: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ContactsError::InvalidInput` if `default_per_page` is outside
    /// `1..=MAX_PER_PAGE`.
    pub fn new(
        data_dir: PathBuf,
        date_boundary: DateBoundary,
        default_per_page: usize,
    ) -> ContactsResult<Self> {
        if !(1..=MAX_PER_PAGE).contains(&default_per_page) {
            return Err(ContactsError::InvalidInput(format!(
                "default_per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        Ok(Self {
            data_dir,
            date_boundary,
            default_per_page,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn date_boundary(&self) -> DateBoundary {
        self.date_boundary
    }

    pub fn default_per_page(&self) -> usize {
        self.default_per_page
    }
}

/// Parse the date boundary from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DateBoundary::Utc`].
pub fn date_boundary_from_env_value(value: Option<String>) -> ContactsResult<DateBoundary> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<DateBoundary>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse the default page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PER_PAGE`].
pub fn per_page_from_env_value(value: Option<String>) -> ContactsResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_PER_PAGE),
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| ContactsError::InvalidInput(format!("invalid page size: {v}"))),
    }
}
