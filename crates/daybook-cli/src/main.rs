//! daybook CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use daybook_cli::cli::{Cli, Command, ConfigAction};
use daybook_cli::commands;
use daybook_cli::config::DaybookConfig;
use daybook_cli::error::CliResult;
use daybook_cli::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    // Load configuration
    let config = match cli.config {
        Some(ref path) => DaybookConfig::load_from(path)?,
        None => DaybookConfig::load()?,
    };

    if let Err(e) = init_logging(&config.logging, cli.debug) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match cli.command {
        Command::Show { file } => commands::record::show(&file, &config),
        Command::Dates { file, json } => commands::record::dates(&file, json, &config),
        Command::Occurrences {
            file,
            from,
            to,
            json,
        } => commands::record::occurrences(&file, from, to, json, &config),
        Command::Export { file } => commands::ics::export(&file, &config),
        Command::Import { ics } => commands::ics::import(&ics, &config),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, cli.config.as_deref()),
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
        },
    }
}
