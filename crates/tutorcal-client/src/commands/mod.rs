//! Subcommand implementations.

pub mod agenda;
pub mod config;
pub mod export;
pub mod inspect;

use chrono::{DateTime, Utc};
use tutorcal_core::{EventKind, TimeWindow, parse_instant};

use crate::cli::FilterArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::export::EventFilter;

/// Builds the event filter for a command.
///
/// `--kind` replaces the configured kinds; `--from` and `--until` accept
/// anything a record date accepts (RFC 3339, naive date-time, date).
pub fn build_filter(args: &FilterArgs, config: &ClientConfig) -> ClientResult<EventFilter> {
    let kinds: Vec<EventKind> = if args.kinds.is_empty() {
        config.export.kinds.clone()
    } else {
        args.kinds.iter().copied().map(EventKind::from).collect()
    };
    let filter = EventFilter::default().with_kinds(kinds);

    let from = parse_bound("--from", args.from.as_deref())?;
    let until = parse_bound("--until", args.until.as_deref())?;
    if from.is_none() && until.is_none() {
        return Ok(filter);
    }

    let window = TimeWindow::from_bounds(from, until)
        .ok_or_else(|| ClientError::Argument("--from must not be after --until".to_string()))?;
    Ok(filter.with_window(window))
}

fn parse_bound(flag: &str, value: Option<&str>) -> ClientResult<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            parse_instant(v).ok_or_else(|| {
                ClientError::Argument(format!("{flag}: cannot read '{v}' as a date or time"))
            })
        })
        .transpose()
}
