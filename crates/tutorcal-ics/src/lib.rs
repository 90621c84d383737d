//! RFC 5545 calendar document writing and reading.
//!
//! - [`encode_calendar`] - Render [`CalendarEvent`](tutorcal_core::CalendarEvent)s as a
//!   `VCALENDAR` document with CRLF lines, escaped text and folded lines
//! - [`inspect_document`] - Validate a document and summarize its events
//! - [`escape`] - Text escaping and line folding primitives

pub mod encode;
pub mod error;
pub mod escape;
pub mod inspect;


// Re-export main types at crate root
pub use encode::{CalendarMeta, DEFAULT_ALARM_MINUTES, encode_calendar, event_uid};
pub use error::{IcsError, IcsResult};
pub use escape::{MAX_LINE_OCTETS, escape_text, fold_line, unescape_text};
pub use inspect::{DocumentSummary, EventSummary, inspect_document, validate_structure};
