//! gar - command-line archive manager with optional password-based
//! encryption.

mod cli;
mod commands;
mod error;
mod logger;
mod output;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    logger::init(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = match &cli.command {
        cli::Commands::Compress(args) => (
            "compress",
            commands::compress::execute(args, &*formatter, cli.verbose),
        ),
        cli::Commands::Extract(args) => (
            "extract",
            commands::extract::execute(args, &*formatter, cli.verbose),
        ),
        cli::Commands::List(args) => (
            "list",
            commands::list::execute(args, &*formatter, cli.verbose),
        ),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            ("completion", Ok(()))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.format_error(operation, &e);
            ExitCode::FAILURE
        }
    }
}
