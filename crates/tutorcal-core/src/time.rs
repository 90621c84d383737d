//! Time helpers for calendar events.
//!
//! Upstream records carry dates in whatever shape the producing code path
//! happened to use. This module turns those shapes into UTC instants and
//! provides [`TimeWindow`] for selecting a range of events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Naive datetime layouts accepted after RFC 3339 fails. Read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parses a textual date into a UTC instant.
///
/// Accepts, in order:
/// - RFC 3339 with any offset (`2024-03-10T09:00:00+02:00`)
/// - naive datetimes (`2024-03-10T09:00:00`, `2024-03-10 09:00`), read as UTC
/// - date-only values (`2024-03-10`), read as midnight UTC
///
/// Returns `None` for blank or unparseable input, including impossible
/// calendar dates such as `2024-02-30`.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    parse_date(value).map(midnight_utc)
}

/// Converts epoch milliseconds into a UTC instant.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Parses a date-only value (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a wall-clock time (`HH:MM` or `HH:MM:SS`).
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Combines a date-only value with a wall-clock time, read as UTC.
pub fn combine_date_and_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    Some(parse_date(date)?.and_time(parse_time(time)?).and_utc())
}

/// Formats an instant in the RFC 5545 UTC basic form (`YYYYMMDDTHHMMSSZ`).
pub fn format_utc_basic(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// A time window for selecting events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window, or `None` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// A window covering every representable instant.
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Creates a window from optional bounds, leaving missing ones open.
    pub fn from_bounds(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        let open = Self::unbounded();
        Self::new(start.unwrap_or(open.start), end.unwrap_or(open.end))
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if an event overlaps this window.
    ///
    /// An event overlaps if it starts before the window ends and ends after
    /// the window starts. Events whose end cannot be computed are matched on
    /// their start alone.
    pub fn overlaps(&self, event: &CalendarEvent) -> bool {
        match event.end_at() {
            Some(end) => event.start_at < self.end && end > self.start,
            None => self.contains(event.start_at),
        }
    }
}
