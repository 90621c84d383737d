//! Reading calendar documents back.
//!
//! [`validate_structure`] checks the RFC 5545 framing rules the encoder
//! promises (CRLF lines, folding width, component nesting, required
//! properties). [`inspect_document`] validates, then unfolds and parses with
//! the `icalendar` parser to summarize what a file contains.

use chrono::{DateTime, NaiveTime, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::debug;

use crate::error::{IcsError, IcsResult};
use crate::escape::{MAX_LINE_OCTETS, unescape_text};

/// One `VEVENT` as read back from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// What a calendar document contains.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    /// `X-WR-CALNAME`, unescaped.
    pub calendar_name: Option<String>,
    /// `PRODID`, unescaped.
    pub product_id: Option<String>,
    pub events: Vec<EventSummary>,
    /// Number of `VALARM` components across all events.
    pub alarm_count: usize,
}

/// Validates and summarizes a calendar document.
pub fn inspect_document(text: &str) -> IcsResult<DocumentSummary> {
    validate_structure(text)?;

    let unfolded = unfold(text);
    let calendar = read_calendar(&unfolded).map_err(|e| IcsError::Parse(e.to_string()))?;

    let header_value = |name: &str| {
        calendar
            .properties
            .iter()
            .find(|p| p.name.as_ref() == name)
            .map(|p| unescape_text(p.val.as_ref()))
    };

    let vevents: Vec<&Component> = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .collect();

    let summary = DocumentSummary {
        calendar_name: header_value("X-WR-CALNAME"),
        product_id: header_value("PRODID"),
        alarm_count: vevents
            .iter()
            .flat_map(|vevent| vevent.components.iter())
            .filter(|c| c.name == "VALARM")
            .count(),
        events: vevents.iter().copied().map(summarize_event).collect(),
    };

    debug!(
        events = summary.events.len(),
        alarms = summary.alarm_count,
        "Inspected calendar document"
    );

    Ok(summary)
}

fn summarize_event(vevent: &Component) -> EventSummary {
    let text = |name: &str| vevent.find_prop(name).map(|p| unescape_text(p.val.as_ref()));
    let time = |name: &str| {
        vevent
            .find_prop(name)
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(to_utc)
    };

    EventSummary {
        uid: text("UID"),
        summary: text("SUMMARY"),
        start: time("DTSTART"),
        end: time("DTEND"),
        status: vevent.find_prop("STATUS").map(|p| p.val.to_string()),
    }
}

fn to_utc(value: DatePerhapsTime) -> DateTime<Utc> {
    match value {
        DatePerhapsTime::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt,
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive.and_utc(),
        // Time zones are not resolved; the wall time is read as UTC.
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => {
            date_time.and_utc()
        }
    }
}

/// An open component while walking a document.
struct OpenComponent {
    name: String,
    properties: Vec<String>,
}

impl OpenComponent {
    fn required_properties(&self) -> &'static [&'static str] {
        match self.name.as_str() {
            "VCALENDAR" => &["VERSION", "PRODID"],
            "VEVENT" => &["UID", "DTSTAMP", "DTSTART"],
            "VALARM" => &["ACTION", "TRIGGER"],
            _ => &[],
        }
    }

    fn check_complete(&self, line: usize) -> IcsResult<()> {
        match self
            .required_properties()
            .iter()
            .find(|required| !self.properties.iter().any(|p| p.as_str() == **required))
        {
            Some(missing) => Err(malformed(
                line,
                format!("{} is missing {missing}", self.name),
            )),
            None => Ok(()),
        }
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> IcsError {
    IcsError::Malformed {
        line,
        reason: reason.into(),
    }
}

/// Checks RFC 5545 framing: CRLF line breaks, folded lines of at most
/// [`MAX_LINE_OCTETS`], balanced `BEGIN`/`END` pairs rooted at `VCALENDAR`,
/// and the required properties of calendars, events and alarms.
///
/// Line numbers in errors are 1-based physical lines.
pub fn validate_structure(text: &str) -> IcsResult<()> {
    let Some(body) = text.strip_suffix("\r\n") else {
        return Err(malformed(1, "document must end with CRLF"));
    };

    let mut stack: Vec<OpenComponent> = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    let mut last_line = 1;

    for (index, physical) in body.split("\r\n").enumerate() {
        let number = index + 1;
        last_line = number;

        if physical.contains(['\r', '\n']) {
            return Err(malformed(number, "bare line break"));
        }
        if physical.len() > MAX_LINE_OCTETS {
            return Err(malformed(
                number,
                format!("line is {} octets long", physical.len()),
            ));
        }

        if let Some(rest) = physical
            .strip_prefix(' ')
            .or_else(|| physical.strip_prefix('\t'))
        {
            match pending.as_mut() {
                Some((_, line)) => line.push_str(rest),
                None => return Err(malformed(number, "continuation without a content line")),
            }
            continue;
        }

        if let Some((start, line)) = pending.replace((number, physical.to_string())) {
            check_content_line(&mut stack, start, &line)?;
        }
    }

    if let Some((start, line)) = pending {
        check_content_line(&mut stack, start, &line)?;
    }

    match stack.last() {
        Some(open) => Err(malformed(last_line, format!("{} is never closed", open.name))),
        None => Ok(()),
    }
}

fn check_content_line(stack: &mut Vec<OpenComponent>, number: usize, line: &str) -> IcsResult<()> {
    let Some((name_part, value)) = line.split_once(':') else {
        return Err(malformed(number, "missing ':' separator"));
    };
    let name = name_part
        .split_once(';')
        .map_or(name_part, |(name, _)| name);

    match name {
        "BEGIN" => {
            if stack.is_empty() && value != "VCALENDAR" {
                return Err(malformed(
                    number,
                    format!("{value} must be nested in VCALENDAR"),
                ));
            }
            stack.push(OpenComponent {
                name: value.to_string(),
                properties: Vec::new(),
            });
        }
        "END" => {
            let Some(open) = stack.pop() else {
                return Err(malformed(number, format!("END:{value} without BEGIN")));
            };
            if open.name != value {
                return Err(malformed(
                    number,
                    format!("END:{value} closes {}", open.name),
                ));
            }
            open.check_complete(number)?;
        }
        _ => match stack.last_mut() {
            Some(open) => open.properties.push(name.to_string()),
            None => return Err(malformed(number, format!("{name} outside any component"))),
        },
    }

    Ok(())
}
