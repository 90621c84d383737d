//! Calendar document encoding.
//!
//! Output is written line by line rather than through a component builder so
//! the byte layout (property order, escaping, folding) stays fixed.

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;
use tutorcal_core::{CalendarEvent, format_utc_basic};

use crate::error::{IcsError, IcsResult};
use crate::escape::{escape_text, fold_line};

/// Default lead time for display reminders.
pub const DEFAULT_ALARM_MINUTES: u32 = 15;

/// Calendar-level identity written into every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    /// Display name (`X-WR-CALNAME`).
    pub name: String,
    /// Product identifier (`PRODID`).
    pub product_id: String,
    /// Domain appended to every UID.
    pub uid_domain: String,
    /// Minutes before the start at which the reminder fires.
    pub alarm_minutes: u32,
}

impl Default for CalendarMeta {
    fn default() -> Self {
        Self {
            name: "Tutorcal".to_string(),
            product_id: "-//Tutorcal//Calendar Export//EN".to_string(),
            uid_domain: "tutorcal.app".to_string(),
            alarm_minutes: DEFAULT_ALARM_MINUTES,
        }
    }
}

impl CalendarMeta {
    /// Creates metadata with the given calendar name and default identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the product identifier.
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    /// Builder method to set the UID domain.
    pub fn with_uid_domain(mut self, domain: impl Into<String>) -> Self {
        self.uid_domain = domain.into();
        self
    }

    /// Builder method to set the reminder lead time.
    pub fn with_alarm_minutes(mut self, minutes: u32) -> Self {
        self.alarm_minutes = minutes;
        self
    }
}

/// Accumulates CRLF-terminated, folded content lines.
#[derive(Default)]
struct ContentLines {
    buf: String,
    alarms: usize,
}

impl ContentLines {
    /// Writes a property whose value is already in wire form.
    fn raw(&mut self, name: &str, value: &str) {
        self.buf.push_str(&fold_line(&format!("{name}:{value}")));
        self.buf.push_str("\r\n");
    }

    /// Writes a TEXT property, escaping the value.
    fn text(&mut self, name: &str, value: &str) {
        self.raw(name, &escape_text(value));
    }

    fn begin(&mut self, component: &str) {
        self.raw("BEGIN", component);
    }

    fn end(&mut self, component: &str) {
        self.raw("END", component);
    }
}

/// Encodes events as an RFC 5545 `VCALENDAR` document.
///
/// `now` stamps every event (`DTSTAMP`) and is folded into each UID, so two
/// calls with the same inputs produce identical bytes. Events are written in
/// the order given.
///
/// # Errors
///
/// Returns [`IcsError::NoEvents`] for an empty slice and
/// [`IcsError::TimeOutOfRange`] when an event's start or end cannot be
/// written as a four-digit year.
pub fn encode_calendar(
    events: &[CalendarEvent],
    meta: &CalendarMeta,
    now: DateTime<Utc>,
) -> IcsResult<String> {
    if events.is_empty() {
        return Err(IcsError::NoEvents);
    }

    let stamp = format_utc_basic(&now);
    let uid_millis = now.timestamp_millis();

    let mut doc = ContentLines::default();
    doc.begin("VCALENDAR");
    doc.raw("VERSION", "2.0");
    doc.text("PRODID", &meta.product_id);
    doc.raw("CALSCALE", "GREGORIAN");
    doc.raw("METHOD", "PUBLISH");
    doc.text("X-WR-CALNAME", &meta.name);
    doc.raw("X-WR-TIMEZONE", "UTC");

    for event in events {
        write_event(&mut doc, event, meta, &stamp, uid_millis)?;
    }

    doc.end("VCALENDAR");

    debug!(
        events = events.len(),
        alarms = doc.alarms,
        bytes = doc.buf.len(),
        "Encoded calendar"
    );

    Ok(doc.buf)
}

/// Builds the UID for an event: `<id>-<millis>@<domain>`.
pub fn event_uid(event: &CalendarEvent, stamp_millis: i64, domain: &str) -> String {
    format!("{}-{}@{}", event.id, stamp_millis, domain)
}

fn write_event(
    doc: &mut ContentLines,
    event: &CalendarEvent,
    meta: &CalendarMeta,
    stamp: &str,
    uid_millis: i64,
) -> IcsResult<()> {
    let out_of_range = || IcsError::TimeOutOfRange {
        id: event.id.clone(),
    };
    let end_at = event.end_at().ok_or_else(out_of_range)?;
    let start = basic_time(&event.start_at).ok_or_else(out_of_range)?;
    let end = basic_time(&end_at).ok_or_else(out_of_range)?;

    doc.begin("VEVENT");
    doc.text("UID", &event_uid(event, uid_millis, &meta.uid_domain));
    doc.raw("DTSTAMP", stamp);
    doc.raw("DTSTART", &start);
    doc.raw("DTEND", &end);
    doc.text("SUMMARY", &event.title);
    if let Some(description) = &event.description {
        doc.text("DESCRIPTION", description);
    }
    if let Some(location) = &event.location {
        doc.text("LOCATION", location);
    }
    doc.raw("STATUS", event.status.as_ics_str());
    if let Some(priority) = event.task_priority() {
        doc.raw("PRIORITY", &priority.ics_level().to_string());
    }

    if event.wants_reminder() {
        doc.begin("VALARM");
        doc.raw("TRIGGER", &format!("-PT{}M", meta.alarm_minutes));
        doc.raw("ACTION", "DISPLAY");
        doc.text("DESCRIPTION", &format!("Reminder: {}", event.title));
        doc.end("VALARM");
        doc.alarms += 1;
    }

    doc.end("VEVENT");
    Ok(())
}

/// Formats a UTC basic timestamp, refusing years that need more than four digits.
fn basic_time(dt: &DateTime<Utc>) -> Option<String> {
    (0..=9999)
        .contains(&dt.year())
        .then(|| format_utc_basic(dt))
}
