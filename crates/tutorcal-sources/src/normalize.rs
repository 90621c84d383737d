//! RawScheduleRecord to CalendarEvent conversion pipeline.
//!
//! This module turns the irregular upstream rows into canonical
//! [`CalendarEvent`]s:
//! 1. Resolves the start instant from an ordered table of candidate fields
//! 2. Resolves the duration, coercing anything unusable to one hour
//! 3. Maps the status, synthesizes title, description and location
//!
//! A record without any usable date produces no event. That is logged and
//! otherwise ignored: one bad row never stops an export.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use tutorcal_core::{
    CalendarEvent, DEFAULT_DURATION_HOURS, EventKind, EventStatus, Priority, UNTITLED_EVENT,
    combine_date_and_time, is_completed_status,
};

use crate::raw_record::{RawDate, RawId, RawScheduleRecord, RawSession, RawTask};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// One entry of a start-date priority table.
pub struct DateCandidate<R> {
    /// The upstream field name, as producers spell it.
    pub field: &'static str,
    read: fn(&R) -> Option<DateTime<Utc>>,
}

impl<R> DateCandidate<R> {
    /// Reads and parses this candidate from a record.
    pub fn read(&self, record: &R) -> Option<DateTime<Utc>> {
        (self.read)(record)
    }
}

/// Session start candidates, tried in order.
///
/// Different booking code paths fill different subsets of these fields; the
/// most specific one present wins.
pub const SESSION_START_CANDIDATES: &[DateCandidate<RawSession>] = &[
    DateCandidate {
        field: "sessionDate",
        read: session_date,
    },
    DateCandidate {
        field: "scheduledStart",
        read: session_scheduled_start,
    },
    DateCandidate {
        field: "scheduledAt",
        read: session_scheduled_at,
    },
    DateCandidate {
        field: "start",
        read: session_generic_start,
    },
];

/// Task date candidates, tried in order. `createdAt` is a last resort.
pub const TASK_START_CANDIDATES: &[DateCandidate<RawTask>] = &[
    DateCandidate {
        field: "dueDate",
        read: task_due_date,
    },
    DateCandidate {
        field: "scheduledAt",
        read: task_scheduled_at,
    },
    DateCandidate {
        field: "createdAt",
        read: task_created_at,
    },
];

/// The start instant chosen for a record and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStart {
    pub field: &'static str,
    pub at: DateTime<Utc>,
}

/// Tries each candidate in order and returns the first valid instant.
pub fn resolve_start<R>(record: &R, candidates: &[DateCandidate<R>]) -> Option<ResolvedStart> {
    candidates.iter().find_map(|candidate| {
        candidate.read(record).map(|at| ResolvedStart {
            field: candidate.field,
            at,
        })
    })
}

/// Resolves the start of a session.
pub fn resolve_session_start(session: &RawSession) -> Option<ResolvedStart> {
    resolve_start(session, SESSION_START_CANDIDATES)
}

/// Resolves the date of a task.
pub fn resolve_task_start(task: &RawTask) -> Option<ResolvedStart> {
    resolve_start(task, TASK_START_CANDIDATES)
}

fn instant(value: &Option<RawDate>) -> Option<DateTime<Utc>> {
    value.as_ref().and_then(RawDate::to_instant)
}

fn session_scheduled_start(session: &RawSession) -> Option<DateTime<Utc>> {
    instant(&session.scheduled_start)
}

fn session_scheduled_at(session: &RawSession) -> Option<DateTime<Utc>> {
    instant(&session.scheduled_at)
}

fn session_generic_start(session: &RawSession) -> Option<DateTime<Utc>> {
    instant(&session.start)
}

fn task_due_date(task: &RawTask) -> Option<DateTime<Utc>> {
    instant(&task.due_date)
}

fn task_scheduled_at(task: &RawTask) -> Option<DateTime<Utc>> {
    instant(&task.scheduled_at)
}

fn task_created_at(task: &RawTask) -> Option<DateTime<Utc>> {
    instant(&task.created_at)
}

/// A date-only `sessionDate` takes its time of day from `startTime`.
fn session_date(session: &RawSession) -> Option<DateTime<Utc>> {
    let date = session.session_date.as_ref()?;
    if let (RawDate::Text(day), Some(time)) = (date, session.start_time.as_deref())
        && let Some(combined) = combine_date_and_time(day, time)
    {
        return Some(combined);
    }
    date.to_instant()
}

/// Converts one record into an event.
///
/// `position` is the record's index in its batch, used as the identifier
/// when the record has none. Returns `None` if no date resolves.
pub fn normalize_record(record: &RawScheduleRecord, position: usize) -> Option<CalendarEvent> {
    let id = event_id(record.kind(), record.id(), position);
    let event = match record {
        RawScheduleRecord::Session(session) => normalize_session(session, id.clone()),
        RawScheduleRecord::Task(task) => normalize_task(task, id.clone()),
    };

    if event.is_none() {
        warn!(
            record_id = %id,
            kind = %record.kind(),
            "Dropping record without a resolvable date"
        );
    }
    event
}

/// Batch normalize records, preserving their relative order.
///
/// Records without a usable date are dropped. Should two records map to the
/// same identifier, the later one gets its position appended (and a counter,
/// if that is taken too) so identifiers stay unique within the batch.
pub fn normalize_records(records: &[RawScheduleRecord]) -> Vec<CalendarEvent> {
    let (events, _) = records.iter().enumerate().fold(
        (Vec::with_capacity(records.len()), HashSet::new()),
        |(mut events, mut seen), (position, record)| {
            if let Some(mut event) = normalize_record(record, position) {
                if !seen.insert(event.id.clone()) {
                    let unique = unused_id(&event.id, position, &seen);
                    warn!(record_id = %event.id, renamed = %unique, "Duplicate record identifier");
                    seen.insert(unique.clone());
                    event.id = unique;
                }
                events.push(event);
            }
            (events, seen)
        },
    );

    debug!(
        input = records.len(),
        output = events.len(),
        "Normalized schedule records"
    );
    events
}

/// Returns `<id>-<position>`, or `<id>-<position>-<n>` for the first free `n`.
fn unused_id(id: &str, position: usize, seen: &HashSet<String>) -> String {
    let base = format!("{}-{}", id, position);
    let mut candidate = base.clone();
    let mut n = 1;
    while seen.contains(&candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    candidate
}

fn event_id(kind: EventKind, raw: Option<&RawId>, position: usize) -> String {
    let key = raw
        .and_then(RawId::as_key)
        .unwrap_or_else(|| position.to_string());
    format!("{}-{}", kind, key)
}

fn normalize_session(session: &RawSession, id: String) -> Option<CalendarEvent> {
    let start = resolve_session_start(session)?;
    debug!(record_id = %id, field = start.field, start = %start.at, "Resolved session start");

    let (title_field, title) = pick_title(&[
        ("title", &session.title),
        ("subject", &session.subject),
        ("description", &session.description),
        ("notes", &session.notes),
    ]);

    let location = non_blank(&session.location).or_else(|| non_blank(&session.meeting_link));

    let mut lines = Vec::new();
    for (field, text) in [
        ("description", &session.description),
        ("notes", &session.notes),
    ] {
        if title_field != Some(field)
            && let Some(text) = non_blank(text)
        {
            lines.push(text.to_string());
        }
    }
    if title_field != Some("subject")
        && let Some(subject) = non_blank(&session.subject)
    {
        lines.push(format!("Subject: {}", subject));
    }
    if let Some(tutor) = non_blank(&session.tutor_name) {
        lines.push(format!("Tutor: {}", tutor));
    }
    if let Some(student) = non_blank(&session.student_name) {
        lines.push(format!("Student: {}", student));
    }
    if let Some(link) = non_blank(&session.meeting_link)
        && location != Some(link)
    {
        lines.push(format!("Meeting link: {}", link));
    }

    let status = session.status.as_deref();
    let mut event = CalendarEvent::new(id, EventKind::Session, title, start.at)
        .with_duration_hours(session_duration(session, start.at))
        .with_status(EventStatus::from_source(status))
        .with_completed(is_completed_status(status))
        .with_description(lines.join("\n"));
    if let Some(location) = location {
        event = event.with_location(location);
    }
    Some(event)
}

/// Explicit duration, else the span to an explicit end, else one hour.
fn session_duration(session: &RawSession, start: DateTime<Utc>) -> f64 {
    if let Some(hours) = session.duration.as_ref().and_then(|d| d.positive()) {
        return hours;
    }
    instant(&session.end_time)
        .filter(|end| *end > start)
        .map(|end| (end - start).num_milliseconds() as f64 / MILLIS_PER_HOUR)
        .unwrap_or(DEFAULT_DURATION_HOURS)
}

fn normalize_task(task: &RawTask, id: String) -> Option<CalendarEvent> {
    let start = resolve_task_start(task)?;
    debug!(record_id = %id, field = start.field, start = %start.at, "Resolved task date");

    let (title_field, title) =
        pick_title(&[("title", &task.title), ("description", &task.description)]);
    let priority = task.priority.as_deref().and_then(Priority::from_source);

    let mut lines = Vec::new();
    if title_field != Some("description")
        && let Some(text) = non_blank(&task.description)
    {
        lines.push(text.to_string());
    }
    if let Some(subject) = non_blank(&task.subject) {
        lines.push(format!("Subject: {}", subject));
    }
    if let Some(priority) = priority {
        lines.push(format!("Priority: {}", priority));
    }
    if let Some(progress) = task.progress.as_ref().and_then(|p| p.to_f64()) {
        lines.push(format!("Progress: {:.0}%", progress.clamp(0.0, 100.0)));
    }
    let tags: Vec<&str> = task
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        lines.push(format!("Tags: {}", tags.join(", ")));
    }

    let hours = task
        .estimated_hours
        .as_ref()
        .and_then(|h| h.positive())
        .unwrap_or(DEFAULT_DURATION_HOURS);
    let status = task.status.as_deref();
    let mut event = CalendarEvent::new(id, EventKind::Task, title, start.at)
        .with_duration_hours(hours)
        .with_status(EventStatus::from_source(status))
        .with_completed(is_completed_status(status))
        .with_description(lines.join("\n"));
    if let Some(priority) = priority {
        event = event.with_priority(priority);
    }
    Some(event)
}

/// Returns the first non-blank candidate and its field name.
fn pick_title<'a>(
    candidates: &[(&'static str, &'a Option<String>)],
) -> (Option<&'static str>, &'a str) {
    candidates
        .iter()
        .find_map(|&(field, value)| non_blank(value).map(|text| (Some(field), text)))
        .unwrap_or((None, UNTITLED_EVENT))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_record::RawNumber;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn record(value: serde_json::Value) -> RawScheduleRecord {
        serde_json::from_value(value).unwrap()
    }

    mod date_priority {
        use super::*;

        #[test]
        fn scheduled_start_beats_generic_start() {
            let session = RawSession {
                start: Some(RawDate::text("2024-03-12T08:00:00Z")),
                ..RawSession::new("1").with_scheduled_start("2024-03-11T15:00:00Z")
            };

            let resolved = resolve_session_start(&session).unwrap();

            assert_eq!(resolved.field, "scheduledStart");
            assert_eq!(resolved.at, utc(2024, 3, 11, 15, 0));
        }

        #[test]
        fn session_date_beats_everything() {
            let session = RawSession {
                session_date: Some(RawDate::text("2024-03-09T10:00:00Z")),
                scheduled_at: Some(RawDate::text("2024-03-10T10:00:00Z")),
                ..RawSession::new("1").with_scheduled_start("2024-03-11T10:00:00Z")
            };

            assert_eq!(
                resolve_session_start(&session).map(|r| r.field),
                Some("sessionDate")
            );
        }

        #[test]
        fn unparseable_candidate_falls_through() {
            let session = RawSession {
                session_date: Some(RawDate::text("Invalid Date")),
                scheduled_at: Some(RawDate::text("2024-03-10T10:00:00Z")),
                ..RawSession::new("1")
            };

            let resolved = resolve_session_start(&session).unwrap();
            assert_eq!(resolved.field, "scheduledAt");
            assert_eq!(resolved.at, utc(2024, 3, 10, 10, 0));
        }

        #[test]
        fn date_only_session_date_uses_start_time() {
            let session = RawSession {
                session_date: Some(RawDate::text("2024-03-11")),
                start_time: Some("15:30".to_string()),
                ..RawSession::new("1")
            };

            assert_eq!(
                resolve_session_start(&session).map(|r| r.at),
                Some(utc(2024, 3, 11, 15, 30))
            );
        }

        #[test]
        fn date_only_session_date_without_time_is_midnight() {
            let session = RawSession {
                session_date: Some(RawDate::text("2024-03-11")),
                start_time: Some("whenever".to_string()),
                ..RawSession::new("1")
            };

            assert_eq!(
                resolve_session_start(&session).map(|r| r.at),
                Some(utc(2024, 3, 11, 0, 0))
            );
        }

        #[test]
        fn task_due_date_beats_created_at() {
            let task = RawTask {
                created_at: Some(RawDate::text("2024-01-01T00:00:00Z")),
                ..RawTask::new("1").with_due_date("2024-03-10T00:00:00Z")
            };

            assert_eq!(
                resolve_task_start(&task),
                Some(ResolvedStart {
                    field: "dueDate",
                    at: utc(2024, 3, 10, 0, 0),
                })
            );
        }

        #[test]
        fn task_falls_back_to_created_at() {
            let task = RawTask {
                created_at: Some(RawDate::Millis(1_710_028_800_000)),
                ..RawTask::new("1")
            };

            assert_eq!(
                resolve_task_start(&task).map(|r| r.field),
                Some("createdAt")
            );
        }

        #[test]
        fn tables_are_in_documented_order() {
            let session: Vec<_> = SESSION_START_CANDIDATES.iter().map(|c| c.field).collect();
            let task: Vec<_> = TASK_START_CANDIDATES.iter().map(|c| c.field).collect();
            assert_eq!(
                session,
                vec!["sessionDate", "scheduledStart", "scheduledAt", "start"]
            );
            assert_eq!(task, vec!["dueDate", "scheduledAt", "createdAt"]);
        }
    }

    mod graceful_skip {
        use super::*;

        #[test]
        fn record_without_date_produces_nothing() {
            let raw = RawScheduleRecord::from(RawTask::new("1").with_title("Someday"));
            assert!(normalize_record(&raw, 0).is_none());
        }

        #[test]
        fn skipped_record_does_not_stop_the_batch() {
            let records: Vec<RawScheduleRecord> = vec![
                RawTask::new("1").with_due_date("2024-03-10").into(),
                RawSession::new("2").with_title("No date").into(),
                RawSession {
                    start: Some(RawDate::text("garbage")),
                    ..RawSession::new("3")
                }
                .into(),
                RawSession::new("4")
                    .with_scheduled_start("2024-03-11T15:00:00Z")
                    .into(),
            ];

            let events = normalize_records(&records);

            let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, vec!["task-1", "session-4"]);
        }

        #[test]
        fn empty_batch_is_fine() {
            assert!(normalize_records(&[]).is_empty());
        }
    }

    mod durations {
        use super::*;

        fn hours(event: &CalendarEvent) -> TimeDelta {
            event.end_at().unwrap() - event.start_at
        }

        #[test]
        fn task_without_estimate_lasts_one_hour() {
            let raw: RawScheduleRecord = RawTask::new("1").with_due_date("2024-03-10T00:00:00Z").into();
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(hours(&event), TimeDelta::hours(1));
        }

        #[test]
        fn task_uses_positive_estimate() {
            let raw: RawScheduleRecord = RawTask::new("1")
                .with_due_date("2024-03-10T00:00:00Z")
                .with_estimated_hours(2.0)
                .into();
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(hours(&event), TimeDelta::hours(2));
        }

        #[test]
        fn bad_estimates_are_coerced() {
            for estimate in [json!(0), json!(-3), json!("lots"), json!({})] {
                let raw = record(json!({
                    "kind": "task",
                    "id": 1,
                    "dueDate": "2024-03-10",
                    "estimatedHours": estimate
                }));
                let event = normalize_record(&raw, 0).unwrap();
                assert_eq!(event.duration_hours, DEFAULT_DURATION_HOURS);
            }
        }

        #[test]
        fn session_uses_explicit_duration() {
            let raw: RawScheduleRecord = RawSession::new("1")
                .with_scheduled_start("2024-03-11T15:00:00Z")
                .with_duration(1.5)
                .into();
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(hours(&event), TimeDelta::minutes(90));
        }

        #[test]
        fn session_falls_back_to_end_time() {
            let raw = record(json!({
                "kind": "session",
                "id": 1,
                "scheduledStart": "2024-03-11T15:00:00Z",
                "scheduledEnd": "2024-03-11T15:45:00Z"
            }));
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(event.duration_hours, 0.75);
        }

        #[test]
        fn session_ignores_end_before_start() {
            let raw = RawScheduleRecord::from(RawSession {
                end_time: Some(RawDate::text("2024-03-11T14:00:00Z")),
                duration: Some(RawNumber::Text("soon".to_string())),
                ..RawSession::new("1").with_scheduled_start("2024-03-11T15:00:00Z")
            });
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(event.duration_hours, DEFAULT_DURATION_HOURS);
        }
    }

    mod fields {
        use super::*;

        #[test]
        fn status_table() {
            let cases = [
                ("cancelled", EventStatus::Cancelled, false),
                ("pending", EventStatus::Tentative, false),
                ("scheduled", EventStatus::Confirmed, false),
                ("in_progress", EventStatus::Confirmed, false),
                ("completed", EventStatus::Confirmed, true),
            ];
            for (status, expected, completed) in cases {
                let raw: RawScheduleRecord = RawSession::new("1")
                    .with_scheduled_start("2024-03-11T15:00:00Z")
                    .with_status(status)
                    .into();
                let event = normalize_record(&raw, 0).unwrap();
                assert_eq!(event.status, expected, "status {status}");
                assert_eq!(event.completed, completed, "status {status}");
            }
        }

        #[test]
        fn missing_status_is_confirmed() {
            let raw: RawScheduleRecord = RawTask::new("1").with_due_date("2024-03-10").into();
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(event.status, EventStatus::Confirmed);
            assert!(!event.completed);
        }

        #[test]
        fn title_falls_back_to_description_then_placeholder() {
            let described = record(json!({
                "kind": "task",
                "id": 1,
                "title": "  ",
                "description": "Read chapter 4",
                "dueDate": "2024-03-10"
            }));
            let bare = record(json!({"kind": "task", "id": 2, "dueDate": "2024-03-10"}));

            let described = normalize_record(&described, 0).unwrap();
            let bare = normalize_record(&bare, 1).unwrap();

            assert_eq!(described.title, "Read chapter 4");
            assert!(described.description.is_none());
            assert_eq!(bare.title, "Untitled Event");
        }

        #[test]
        fn session_title_uses_subject_before_notes() {
            let raw = record(json!({
                "kind": "session",
                "id": 1,
                "subject": "Chemistry",
                "notes": "Bring lab report",
                "scheduledAt": "2024-03-11T15:00:00Z"
            }));
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(event.title, "Chemistry");
            assert_eq!(event.description.as_deref(), Some("Bring lab report"));
        }

        #[test]
        fn session_description_and_location() {
            let raw = record(json!({
                "kind": "session",
                "id": 1,
                "title": "Algebra",
                "subject": "Mathematics",
                "tutorName": "Ada Lovelace",
                "studentName": "Sam",
                "meetingLink": "https://meet.example.com/abc",
                "location": "Library, room 2",
                "scheduledStart": "2024-03-11T15:00:00Z"
            }));
            let event = normalize_record(&raw, 0).unwrap();

            assert_eq!(event.location.as_deref(), Some("Library, room 2"));
            assert_eq!(
                event.description.as_deref(),
                Some(
                    "Subject: Mathematics\nTutor: Ada Lovelace\nStudent: Sam\nMeeting link: https://meet.example.com/abc"
                )
            );
        }

        #[test]
        fn meeting_link_becomes_location() {
            let raw = record(json!({
                "kind": "session",
                "id": 1,
                "meetingLink": "https://meet.example.com/abc",
                "scheduledStart": "2024-03-11T15:00:00Z"
            }));
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(
                event.location.as_deref(),
                Some("https://meet.example.com/abc")
            );
            assert!(event.description.is_none());
        }

        #[test]
        fn task_description_lines() {
            let raw = record(json!({
                "kind": "task",
                "id": 1,
                "title": "Essay",
                "description": "Argumentative essay",
                "subject": "English",
                "priority": "urgent",
                "progress": 140,
                "tags": ["writing", " ", "homework"],
                "dueDate": "2024-03-10"
            }));
            let event = normalize_record(&raw, 0).unwrap();

            assert_eq!(event.priority, Some(Priority::Urgent));
            assert_eq!(
                event.description.as_deref(),
                Some(
                    "Argumentative essay\nSubject: English\nPriority: urgent\nProgress: 100%\nTags: writing, homework"
                )
            );
        }

        #[test]
        fn unknown_priority_is_dropped() {
            let raw: RawScheduleRecord = RawTask::new("1")
                .with_due_date("2024-03-10")
                .with_priority("whenever")
                .into();
            let event = normalize_record(&raw, 0).unwrap();
            assert_eq!(event.priority, None);
        }
    }

    mod identifiers {
        use super::*;

        #[test]
        fn ids_are_prefixed_by_kind() {
            let records: Vec<RawScheduleRecord> = vec![
                RawSession::new("1")
                    .with_scheduled_start("2024-03-11T15:00:00Z")
                    .into(),
                RawTask::new("1").with_due_date("2024-03-10").into(),
            ];
            let ids: Vec<_> = normalize_records(&records)
                .into_iter()
                .map(|e| e.id)
                .collect();
            assert_eq!(ids, vec!["session-1", "task-1"]);
        }

        #[test]
        fn missing_id_uses_position() {
            let raw = record(json!({"kind": "task", "dueDate": "2024-03-10"}));
            assert_eq!(normalize_record(&raw, 4).unwrap().id, "task-4");
        }

        #[test]
        fn duplicate_ids_are_made_unique() {
            let records: Vec<RawScheduleRecord> = vec![
                RawTask::new("5").with_due_date("2024-03-10").into(),
                RawTask::new("5").with_due_date("2024-03-11").into(),
            ];
            let ids: Vec<_> = normalize_records(&records)
                .into_iter()
                .map(|e| e.id)
                .collect();
            assert_eq!(ids, vec!["task-5", "task-5-1"]);
        }

        #[test]
        fn renamed_ids_never_collide_with_real_ones() {
            let records: Vec<RawScheduleRecord> = vec![
                RawTask::new("5").with_due_date("2024-03-10").into(),
                RawTask::new("5-2").with_due_date("2024-03-11").into(),
                RawTask::new("5").with_due_date("2024-03-12").into(),
                RawTask::new("5-2-2").with_due_date("2024-03-13").into(),
            ];
            let ids: Vec<_> = normalize_records(&records)
                .into_iter()
                .map(|e| e.id)
                .collect();
            assert_eq!(ids, vec!["task-5", "task-5-2", "task-5-2-2", "task-5-2-2-3"]);

            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
        }
    }
}
