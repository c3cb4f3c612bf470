//! Entry point for the `gridcurl` binary.
//!
//! Every failure surfaces here as a `gridcurl_core::Error`, which is printed
//! to stderr and mapped to its exit code. The HTTP status of a completed
//! request never affects the exit code.

use std::process::ExitCode;

use clap::Parser;
use gridcurl::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    gridcurl::init_logging(cli.verbose);

    let stdout = std::io::stdout();
    match gridcurl::run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
