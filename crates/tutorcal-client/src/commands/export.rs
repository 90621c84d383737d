//! The `export` command.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tutorcal_sources::load_records_from_path;

use crate::config::ClientConfig;
use crate::delivery::{DirectoryDelivery, StdoutDelivery};
use crate::error::{ClientError, ClientResult};
use crate::export::{EventFilter, ExportReport, ExportSettings, Exporter};

/// Where the exported document should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Directory(PathBuf),
    Stdout,
}

impl Target {
    /// Picks the target from flags, then configuration, then the working directory.
    pub fn resolve(stdout: bool, output_dir: Option<PathBuf>, config: &ClientConfig) -> Self {
        if stdout {
            return Self::Stdout;
        }
        Self::Directory(
            output_dir
                .or_else(|| config.export.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
        )
    }
}

/// Loads `input`, exports it to `target` and prints the report.
///
/// With a stdout target the report goes to stderr so the calendar stays
/// clean on stdout.
pub fn run(
    config: &ClientConfig,
    input: &Path,
    target: Target,
    filter: EventFilter,
    json: bool,
) -> ClientResult<()> {
    let records = load_records_from_path(input)?;
    let settings = ExportSettings::from_config(config).with_filter(filter);
    let now = Utc::now();

    let (outcome, report_to_stderr) = match target {
        Target::Stdout => (
            Exporter::new(settings, StdoutDelivery::stdout()).export(&records, now),
            true,
        ),
        Target::Directory(dir) => (
            Exporter::new(settings, DirectoryDelivery::new(dir)).export(&records, now),
            false,
        ),
    };

    let report = outcome.report();
    if let Some(text) = render_report(&report, json)? {
        if report_to_stderr {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    if report.success {
        Ok(())
    } else {
        Err(ClientError::Export(report.message))
    }
}

/// Renders the report for the terminal.
///
/// Plain-text failures render nothing; the error itself is printed by `main`.
pub fn render_report(report: &ExportReport, json: bool) -> ClientResult<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string_pretty(report)?));
    }
    Ok(report.success.then(|| report.message.clone()))
}
