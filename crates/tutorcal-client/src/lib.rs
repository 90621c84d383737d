//! Export orchestration, file delivery, configuration and the CLI.
//!
//! This crate provides the `tutorcal` command-line interface. The library
//! half is usable on its own:
//!
//! - [`Exporter`] - Normalize, filter, encode and deliver in one call
//! - [`FileDelivery`] - Where finished documents go
//! - [`ClientConfig`] - `config.toml` settings

pub mod cli;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;

pub use cli::Cli;
pub use config::ClientConfig;
pub use delivery::{DeliveryError, DirectoryDelivery, FileDelivery, StdoutDelivery};
pub use error::{ClientError, ClientResult};
pub use export::{
    EventFilter, ExportFile, ExportOutcome, ExportReport, ExportSettings, Exporter, ICS_MIME_TYPE,
    export_filename,
};
