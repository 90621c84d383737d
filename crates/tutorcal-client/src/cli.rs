//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tutorcal_core::EventKind;

/// tutorcal - Tutoring sessions and study tasks as a calendar file
#[derive(Debug, Parser)]
#[command(name = "tutorcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TUTORCAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export sessions and tasks as an .ics file
    Export {
        /// JSON file with session and task records
        input: PathBuf,

        /// Directory to write the file into (defaults to export.output_dir, then ".")
        #[arg(long, short, conflicts_with = "stdout")]
        output_dir: Option<PathBuf>,

        /// Write the calendar to stdout instead of a file
        #[arg(long)]
        stdout: bool,

        /// Print the export report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show normalized events grouped by day
    Agenda {
        /// JSON file with session and task records
        input: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Validate an .ics file and summarize its events
    Inspect {
        /// Calendar file to read
        file: PathBuf,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Event selection shared by `export` and `agenda`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only include this kind of record (can be repeated)
    #[arg(long = "kind", value_enum, action = clap::ArgAction::Append)]
    pub kinds: Vec<KindArg>,

    /// Only include events ending after this date or time
    #[arg(long)]
    pub from: Option<String>,

    /// Only include events starting before this date or time
    #[arg(long)]
    pub until: Option<String>,
}

/// Record kinds selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Session,
    Task,
}

impl From<KindArg> for EventKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Session => EventKind::Session,
            KindArg::Task => EventKind::Task,
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
