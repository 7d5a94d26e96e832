//! Main entry point for the `patchport` CLI. It parses arguments, dispatches
//! to the appropriate command handler, and maps errors to exit codes.

use patchport::cli::Cli;
use patchport::{commands, exit_codes};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
