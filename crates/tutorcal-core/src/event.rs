//! Canonical calendar event types.
//!
//! This module provides the single in-memory representation every scheduling
//! record is normalized into before export:
//! - [`CalendarEvent`]: one session or task, anchored at a UTC instant
//! - [`EventKind`]: where the event came from
//! - [`EventStatus`]: the three statuses a calendar document can carry
//! - [`Priority`]: task urgency
//!
//! Events are built fresh for every export and never persisted, so they carry
//! no identity beyond their `id`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a record carries no usable text at all.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Duration applied when the source gives none, or gives garbage.
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Shortest length an event is given, one second.
const MIN_DURATION_MILLIS: f64 = 1_000.0;

/// The kind of record an event was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A booked tutoring session.
    Session,
    /// A study task with a due date.
    Task,
}

impl EventKind {
    /// Returns the lowercase name used in identifiers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized event status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// The event is happening as planned.
    #[default]
    Confirmed,
    /// The event is not settled yet (source status `pending`).
    Tentative,
    /// The event will not happen.
    Cancelled,
}

impl EventStatus {
    /// Maps a source status string onto the normalized status.
    ///
    /// Only `cancelled` and `pending` are significant; everything else,
    /// including a missing status, is confirmed.
    pub fn from_source(status: Option<&str>) -> Self {
        match status.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("cancelled") => Self::Cancelled,
            Some(s) if s.eq_ignore_ascii_case("pending") => Self::Tentative,
            _ => Self::Confirmed,
        }
    }

    /// Returns the RFC 5545 `STATUS` value.
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Tentative => "TENTATIVE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Returns true if the source status marks a finished session or task.
pub fn is_completed_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.trim().eq_ignore_ascii_case("completed"))
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parses a source priority string, ignoring ASCII case and whitespace.
    pub fn from_source(value: &str) -> Option<Self> {
        let value = value.trim();
        [Self::Low, Self::Medium, Self::High, Self::Urgent]
            .into_iter()
            .find(|p| value.eq_ignore_ascii_case(p.as_str()))
    }

    /// Returns the lowercase name of this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Returns the RFC 5545 `PRIORITY` level (lower is more urgent).
    pub fn ics_level(&self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::High => 3,
            Self::Medium => 5,
            Self::Low => 7,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized calendar event.
///
/// The end of an event is never stored: it is always `start_at` plus
/// `duration_hours`, see [`CalendarEvent::end_at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Identifier, unique within one export (e.g. `session-12`).
    pub id: String,
    /// Where the event came from.
    pub kind: EventKind,
    /// Display title, never empty.
    pub title: String,
    /// Free-form, possibly multi-line, description.
    pub description: Option<String>,
    /// Physical place or meeting URL.
    pub location: Option<String>,
    /// When the event starts.
    pub start_at: DateTime<Utc>,
    /// Length of the event in hours, always positive.
    pub duration_hours: f64,
    /// Normalized status.
    pub status: EventStatus,
    /// Whether the source record reached its terminal `completed` state.
    pub completed: bool,
    /// Task urgency; ignored for sessions.
    pub priority: Option<Priority>,
}

impl CalendarEvent {
    /// Creates a confirmed one-hour event.
    ///
    /// A blank title is replaced with [`UNTITLED_EVENT`].
    pub fn new(
        id: impl Into<String>,
        kind: EventKind,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED_EVENT.to_string()
        } else {
            title
        };
        Self {
            id: id.into(),
            kind,
            title,
            description: None,
            location: None,
            start_at,
            duration_hours: DEFAULT_DURATION_HOURS,
            status: EventStatus::Confirmed,
            completed: false,
            priority: None,
        }
    }

    /// Builder method to set the description. Blank text clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    /// Builder method to set the location. Blank text clears it.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    /// Builder method to set the duration.
    ///
    /// Non-finite, zero and negative values fall back to
    /// [`DEFAULT_DURATION_HOURS`].
    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = if hours.is_finite() && hours > 0.0 {
            hours
        } else {
            DEFAULT_DURATION_HOURS
        };
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to mark the event as completed.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Builder method to set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns the event length, or `None` if it cannot be represented.
    ///
    /// Lengths shorter than a second are stretched to one second so the end
    /// never lands on the start once timestamps are truncated to seconds.
    pub fn duration(&self) -> Option<TimeDelta> {
        let millis = (self.duration_hours * MILLIS_PER_HOUR)
            .round()
            .max(MIN_DURATION_MILLIS);
        if !millis.is_finite() || millis > i64::MAX as f64 {
            return None;
        }
        TimeDelta::try_milliseconds(millis as i64)
    }

    /// Returns when the event ends, or `None` on overflow.
    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.start_at.checked_add_signed(self.duration()?)
    }

    /// Returns the priority if this is a task.
    pub fn task_priority(&self) -> Option<Priority> {
        match self.kind {
            EventKind::Task => self.priority,
            EventKind::Session => None,
        }
    }

    /// Returns true if a reminder should be attached to this event.
    ///
    /// Cancelled and completed events never get one.
    pub fn wants_reminder(&self) -> bool {
        self.status != EventStatus::Cancelled && !self.completed
    }
}

/// Groups events by the UTC date they start on.
///
/// Events keep their relative input order within each day.
pub fn index_by_day(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<&CalendarEvent>> {
    events.iter().fold(BTreeMap::new(), |mut days, event| {
        days.entry(event.start_at.date_naive())
            .or_insert_with(Vec::new)
            .push(event);
        days
    })
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
