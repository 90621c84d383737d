//! The `agenda` command: normalized events grouped by day.

use std::collections::BTreeMap;
use std::path::Path;

use tutorcal_core::{CalendarEvent, EventStatus, index_by_day};
use tutorcal_sources::{load_records_from_path, normalize_records};

use crate::error::ClientResult;
use crate::export::EventFilter;

/// Loads `input`, normalizes and filters it, and prints the agenda.
pub fn run(input: &Path, filter: &EventFilter, json: bool) -> ClientResult<()> {
    let records = load_records_from_path(input)?;
    let events = filter.apply(normalize_records(&records));

    if json {
        println!("{}", render_json(&events)?);
    } else {
        print!("{}", render_text(&events));
    }
    Ok(())
}

/// Renders one block per UTC day, events in input order.
pub fn render_text(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "No events\n".to_string();
    }

    let mut out = String::new();
    for (day, day_events) in index_by_day(events) {
        out.push_str(&format!("{}\n", day.format("%a %Y-%m-%d")));
        for event in day_events {
            out.push_str(&format!("  {}\n", agenda_line(event)));
        }
    }
    out
}

fn agenda_line(event: &CalendarEvent) -> String {
    let end = event
        .end_at()
        .map(|end| end.format("%H:%M").to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut line = format!(
        "{}-{}  [{}] {}",
        event.start_at.format("%H:%M"),
        end,
        event.kind,
        event.title
    );

    match event.status {
        EventStatus::Confirmed => {}
        EventStatus::Tentative => line.push_str(" (tentative)"),
        EventStatus::Cancelled => line.push_str(" (cancelled)"),
    }
    if event.completed {
        line.push_str(" (completed)");
    }
    if let Some(priority) = event.task_priority() {
        line.push_str(&format!(" !{priority}"));
    }
    line
}

/// Renders the agenda as a JSON object keyed by ISO date.
pub fn render_json(events: &[CalendarEvent]) -> ClientResult<String> {
    let days: BTreeMap<String, Vec<&CalendarEvent>> = index_by_day(events)
        .into_iter()
        .map(|(day, day_events)| (day.to_string(), day_events))
        .collect();
    Ok(serde_json::to_string_pretty(&days)?)
}
