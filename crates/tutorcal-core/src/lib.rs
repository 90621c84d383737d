//! Core types: canonical calendar events, time helpers, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{
    CalendarEvent, DEFAULT_DURATION_HOURS, EventKind, EventStatus, Priority, UNTITLED_EVENT,
    index_by_day, is_completed_status,
};
pub use time::{
    TimeWindow, combine_date_and_time, format_utc_basic, from_epoch_millis, parse_date,
    parse_instant, parse_time,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
