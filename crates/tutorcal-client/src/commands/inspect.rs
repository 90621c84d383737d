//! The `inspect` command.

use std::path::Path;

use tutorcal_ics::{DocumentSummary, inspect_document};

use crate::error::ClientResult;

/// Validates an .ics file and prints what it contains.
pub fn run(file: &Path) -> ClientResult<()> {
    let text = std::fs::read_to_string(file)?;
    let summary = inspect_document(&text)?;
    print!("{}", render(&summary));
    Ok(())
}

pub fn render(summary: &DocumentSummary) -> String {
    let mut out = format!(
        "Calendar: {}\nEvents: {}\nAlarms: {}\n",
        summary.calendar_name.as_deref().unwrap_or("(unnamed)"),
        summary.events.len(),
        summary.alarm_count
    );
    for event in &summary.events {
        let start = event
            .start
            .map(|s| s.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "????-??-?? ??:??".to_string());
        out.push_str(&format!(
            "  {}  {}  {}\n",
            start,
            event.status.as_deref().unwrap_or("-"),
            event.uid.as_deref().unwrap_or("(no uid)")
        ));
    }
    out
}
