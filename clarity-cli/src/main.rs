use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use clarity_cli::cli::Cli;
use clarity_cli::commands::{describe_error, load_tables, run};
use clarity_cli::config::ClarityConfig;
use clarity_cli::logging;

fn execute(cli: &Cli) -> Result<String> {
    let (config, source) = ClarityConfig::resolve(cli.config.as_deref())?;
    if let Some(path) = &source {
        debug!(path = %path.display(), "using config file");
    }

    if let Some(level) = cli.log_level.as_deref().or(config.logging.level.as_deref()) {
        logging::set_log_level(level)?;
    }
    if let Some(path) = cli.log_file.as_deref().or(config.logging.file.as_deref()) {
        logging::enable_file_logging(path)?;
    }

    let tables = load_tables(cli.tables.as_deref(), cli.tax_year, &config.tables)?;
    run(&cli.command, &tables, &config, cli.format)
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
