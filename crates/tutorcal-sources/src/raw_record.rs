//! Raw scheduling records as the booking and task services hand them over.
//!
//! This module defines [`RawScheduleRecord`], a permissive representation of
//! the session and task rows produced upstream, before normalization.
//!
//! Nothing here is trusted: field names arrive in camelCase or snake_case,
//! dates arrive as strings in several layouts or as epoch milliseconds, and
//! numbers arrive as numbers, numeric strings, or garbage. Every field is
//! optional so that one odd value never rejects a whole record; the
//! normalizer decides what is usable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tutorcal_core::{EventKind, from_epoch_millis, parse_instant};

/// A record identifier: upstream uses both string and integer keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
    /// Floats, booleans, objects; only numbers yield a key.
    Other(Value),
}

impl RawId {
    /// Returns the identifier as a key, or `None` if it is blank.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Self::Other(Value::Number(n)) => Some(n.to_string()),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// A date field in whatever shape the producer used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    /// Epoch milliseconds.
    Millis(i64),
    /// Any textual layout understood by [`parse_instant`].
    Text(String),
    /// Anything else (booleans, objects, floats); never resolves.
    Other(Value),
}

impl RawDate {
    /// Creates a textual date.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Resolves the value to a UTC instant, if it holds a valid one.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => from_epoch_millis(*ms),
            Self::Text(s) => parse_instant(s),
            Self::Other(_) => None,
        }
    }
}

/// A numeric field that may arrive as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawNumber {
    /// Returns the value as a finite float.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
            Self::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Returns the value if it is a usable positive amount.
    pub fn positive(&self) -> Option<f64> {
        self.to_f64().filter(|v| *v > 0.0)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A tutoring session row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSession {
    #[serde(alias = "_id", alias = "session_id", alias = "sessionId")]
    pub id: Option<RawId>,

    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub notes: Option<String>,

    // === Start candidates, most specific first ===
    #[serde(alias = "session_date")]
    pub session_date: Option<RawDate>,
    /// Wall-clock time paired with a date-only `session_date`.
    #[serde(alias = "start_time", deserialize_with = "lenient_text")]
    pub start_time: Option<String>,
    #[serde(alias = "scheduled_start")]
    pub scheduled_start: Option<RawDate>,
    #[serde(alias = "scheduled_at")]
    pub scheduled_at: Option<RawDate>,
    #[serde(alias = "startAt", alias = "start_at")]
    pub start: Option<RawDate>,

    // === Length ===
    /// Length in hours.
    #[serde(alias = "durationHours", alias = "duration_hours")]
    pub duration: Option<RawNumber>,
    #[serde(
        alias = "end_time",
        alias = "scheduledEnd",
        alias = "scheduled_end",
        alias = "end"
    )]
    pub end_time: Option<RawDate>,

    /// `scheduled`, `completed`, `cancelled`, `pending` or `in_progress`.
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(
        alias = "meeting_link",
        alias = "meetingUrl",
        alias = "meeting_url",
        deserialize_with = "lenient_text"
    )]
    pub meeting_link: Option<String>,

    #[serde(alias = "tutor_name", deserialize_with = "lenient_text")]
    pub tutor_name: Option<String>,
    #[serde(alias = "student_name", deserialize_with = "lenient_text")]
    pub student_name: Option<String>,
}

impl RawSession {
    /// Creates an empty session with the given identifier.
    pub fn new(id: impl Into<RawId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder method to set the `scheduledStart` candidate.
    pub fn with_scheduled_start(mut self, start: impl Into<String>) -> Self {
        self.scheduled_start = Some(RawDate::text(start));
        self
    }

    /// Builder method to set the duration in hours.
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration = Some(RawNumber::from(hours));
        self
    }
}

/// A study task row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTask {
    #[serde(alias = "_id", alias = "task_id", alias = "taskId")]
    pub id: Option<RawId>,

    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,

    // === Date candidates, most specific first ===
    #[serde(alias = "due_date", alias = "dueAt", alias = "due_at")]
    pub due_date: Option<RawDate>,
    #[serde(alias = "scheduled_at")]
    pub scheduled_at: Option<RawDate>,
    #[serde(alias = "created_at")]
    pub created_at: Option<RawDate>,

    /// Expected effort in hours.
    #[serde(alias = "estimated_hours", alias = "estimatedDuration")]
    pub estimated_hours: Option<RawNumber>,

    /// `low`, `medium`, `high` or `urgent`.
    #[serde(deserialize_with = "lenient_text")]
    pub priority: Option<String>,
    /// `pending`, `in-progress` or `completed`.
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
    /// Completion percentage, 0 to 100.
    #[serde(alias = "progress_percent", alias = "progressPercent")]
    pub progress: Option<RawNumber>,

    #[serde(deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Vec<String>,
}

impl RawTask {
    /// Creates an empty task with the given identifier.
    pub fn new(id: impl Into<RawId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder method to set the due date.
    pub fn with_due_date(mut self, due: impl Into<String>) -> Self {
        self.due_date = Some(RawDate::text(due));
        self
    }

    /// Builder method to set the estimated hours.
    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(RawNumber::from(hours));
        self
    }

    /// Builder method to set the priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// One upstream scheduling record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawScheduleRecord {
    Session(RawSession),
    Task(RawTask),
}

impl RawScheduleRecord {
    /// Returns the kind of event this record normalizes into.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Session(_) => EventKind::Session,
            Self::Task(_) => EventKind::Task,
        }
    }

    /// Returns the upstream identifier, if any.
    pub fn id(&self) -> Option<&RawId> {
        match self {
            Self::Session(s) => s.id.as_ref(),
            Self::Task(t) => t.id.as_ref(),
        }
    }
}

impl From<RawSession> for RawScheduleRecord {
    fn from(session: RawSession) -> Self {
        Self::Session(session)
    }
}

impl From<RawTask> for RawScheduleRecord {
    fn from(task: RawTask) -> Self {
        Self::Task(task)
    }
}

/// Reads strings and numbers as text. Anything else counts as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Reads a list of labels, or a single label. Unusable entries are dropped.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
