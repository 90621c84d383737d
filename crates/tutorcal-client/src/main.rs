//! tutorcal CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tutorcal_core::{TracingConfig, init_tracing};

use tutorcal_client::cli::{Cli, Command, ConfigAction};
use tutorcal_client::commands;
use tutorcal_client::config::ClientConfig;
use tutorcal_client::error::ClientResult;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first so its debug flag can raise the log level.
    let loaded = load_config(cli.config.clone());
    let debug = cli.debug || loaded.as_ref().is_ok_and(|(_, config)| config.debug);

    let tracing_config = if debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match loaded.and_then(|(path, config)| run(cli.command, &path, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads an explicit config file strictly, the default one only if present.
fn load_config(explicit: Option<PathBuf>) -> ClientResult<(PathBuf, ClientConfig)> {
    match explicit {
        Some(path) => {
            let config = ClientConfig::load_from(&path)?;
            Ok((path, config))
        }
        None => Ok((ClientConfig::default_path(), ClientConfig::load()?)),
    }
}

fn run(command: Command, config_path: &Path, config: &ClientConfig) -> ClientResult<()> {
    match command {
        Command::Export {
            input,
            output_dir,
            stdout,
            json,
            filter,
        } => {
            config.validate()?;
            let target = commands::export::Target::resolve(stdout, output_dir, config);
            let filter = commands::build_filter(&filter, config)?;
            commands::export::run(config, &input, target, filter, json)
        }
        Command::Agenda {
            input,
            json,
            filter,
        } => {
            let filter = commands::build_filter(&filter, config)?;
            commands::agenda::run(&input, &filter, json)
        }
        Command::Inspect { file } => commands::inspect::run(&file),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(config, config_path),
            ConfigAction::Validate => commands::config::validate(config),
            ConfigAction::Path => commands::config::path(config_path),
        },
    }
}
