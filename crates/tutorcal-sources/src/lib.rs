//! Raw scheduling records and the normalization pipeline.
//!
//! This crate is the input boundary of the export pipeline:
//!
//! - [`RawScheduleRecord`] - Session and task rows exactly as upstream sends them
//! - [`load_records`] - Tolerant JSON loading (tagged lists or snapshots)
//! - [`normalize_records`] - Pipeline to convert raw records to canonical events
//! - [`SourceError`] - Errors for unreadable documents
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │ Booking service │    │  Task service   │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          └──────────┬───────────┘
//!                     │ JSON
//!                     ▼ load_records()
//!          ┌────────────────────┐
//!          │ RawScheduleRecord  │
//!          └─────────┬──────────┘
//!                    │
//!                    ▼ normalize_records()
//!          ┌────────────────────┐
//!          │   CalendarEvent    │
//!          └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tutorcal_sources::{load_records_from_path, normalize_records};
//!
//! let records = load_records_from_path(path)?;
//! let events = normalize_records(&records);
//! ```

pub mod error;
pub mod normalize;
pub mod raw_record;
pub mod snapshot;

// Re-export main types at crate root
pub use error::{SourceError, SourceResult};
pub use normalize::{
    DateCandidate, ResolvedStart, SESSION_START_CANDIDATES, TASK_START_CANDIDATES,
    normalize_record, normalize_records, resolve_session_start, resolve_start, resolve_task_start,
};
pub use raw_record::{RawDate, RawId, RawNumber, RawScheduleRecord, RawSession, RawTask};
pub use snapshot::{load_records, load_records_from_path, parse_records};
