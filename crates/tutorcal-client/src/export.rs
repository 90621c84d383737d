//! Export orchestration.
//!
//! [`Exporter::export`] runs the whole pipeline for one invocation:
//! normalize raw records, filter, encode, and hand the document to a
//! [`FileDelivery`]. Nothing below this boundary reaches the caller as an
//! error: every run ends in an [`ExportOutcome`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tutorcal_core::{CalendarEvent, EventKind, TimeWindow};
use tutorcal_ics::{CalendarMeta, encode_calendar};
use tutorcal_sources::{RawScheduleRecord, normalize_records};

use crate::config::ClientConfig;
use crate::delivery::FileDelivery;

/// MIME type of exported documents.
pub const ICS_MIME_TYPE: &str = "text/calendar; charset=utf-8";

/// Message reported when there is nothing to export.
pub const NOTHING_TO_EXPORT: &str = "No events to export";

/// Returns the export filename: `<product>-calendar-<YYYY-MM-DD>.ics`.
pub fn export_filename(product: &str, now: DateTime<Utc>) -> String {
    format!("{}-calendar-{}.ics", product, now.format("%Y-%m-%d"))
}

/// Narrows the normalized events before encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Kinds to keep. Empty keeps every kind.
    pub kinds: Vec<EventKind>,
    /// Only keep events overlapping this window.
    pub window: Option<TimeWindow>,
}

impl EventFilter {
    /// Builder method to restrict the kinds.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Builder method to restrict to a time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Returns true if the event passes the filter.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && self.window.is_none_or(|window| window.overlaps(event))
    }

    /// Keeps matching events in their original order.
    pub fn apply(&self, events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Everything the exporter needs besides the records.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Filename prefix.
    pub product: String,
    /// Calendar identity for the encoder.
    pub meta: CalendarMeta,
    pub filter: EventFilter,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            product: "tutorcal".to_string(),
            meta: CalendarMeta::default(),
            filter: EventFilter::default(),
        }
    }
}

impl ExportSettings {
    /// Builds settings from the loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            product: config.export.product.clone(),
            meta: config.calendar.to_meta(),
            filter: EventFilter::default().with_kinds(config.export.kinds.iter().copied()),
        }
    }

    /// Builder method to replace the filter.
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A finished document ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub body: String,
}

/// How an export run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The document was encoded and delivered.
    Exported {
        count: usize,
        filename: String,
        /// Where the delivery put it, if it has a name.
        location: Option<String>,
    },
    /// No event survived normalization and filtering.
    NothingToExport,
    /// Encoding or delivery failed.
    Failed { message: String },
}

/// Structured result handed to the user interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub success: bool,
    pub message: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ExportOutcome {
    /// Returns true unless the run failed.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Returns the number of exported events.
    pub fn count(&self) -> usize {
        match self {
            Self::Exported { count, .. } => *count,
            Self::NothingToExport | Self::Failed { .. } => 0,
        }
    }

    /// Converts the outcome into the user-facing report.
    pub fn report(&self) -> ExportReport {
        match self {
            Self::Exported {
                count,
                filename,
                location,
            } => ExportReport {
                success: true,
                message: match location {
                    Some(location) => format!("Exported {count} events to {location}"),
                    None => format!("Exported {count} events"),
                },
                count: *count,
                filename: Some(filename.clone()),
            },
            Self::NothingToExport => ExportReport {
                success: true,
                message: NOTHING_TO_EXPORT.to_string(),
                count: 0,
                filename: None,
            },
            Self::Failed { message } => ExportReport {
                success: false,
                message: message.clone(),
                count: 0,
                filename: None,
            },
        }
    }
}

/// Runs exports against one delivery target.
#[derive(Debug)]
pub struct Exporter<D> {
    settings: ExportSettings,
    delivery: D,
}

impl<D: FileDelivery> Exporter<D> {
    pub fn new(settings: ExportSettings, delivery: D) -> Self {
        Self { settings, delivery }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Returns the delivery target.
    pub fn into_delivery(self) -> D {
        self.delivery
    }

    /// Exports `records` as one calendar document stamped with `now`.
    pub fn export(&mut self, records: &[RawScheduleRecord], now: DateTime<Utc>) -> ExportOutcome {
        let events = self.settings.filter.apply(normalize_records(records));
        if events.is_empty() {
            info!(records = records.len(), "Nothing to export");
            return ExportOutcome::NothingToExport;
        }

        let body = match encode_calendar(&events, &self.settings.meta, now) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode calendar");
                return ExportOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        let file = ExportFile {
            filename: export_filename(&self.settings.product, now),
            mime_type: ICS_MIME_TYPE,
            body,
        };

        match self.delivery.deliver(&file) {
            Ok(location) => {
                info!(
                    events = events.len(),
                    filename = %file.filename,
                    "Exported calendar"
                );
                ExportOutcome::Exported {
                    count: events.len(),
                    filename: file.filename,
                    location,
                }
            }
            Err(e) => {
                error!(error = %e, filename = %file.filename, "Failed to deliver calendar");
                ExportOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
