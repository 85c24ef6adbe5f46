//! sandbox-repl
//!
//! Entry point of the REPL. Parses CLI arguments and drives a session on a
//! current-thread runtime, since the engine context never leaves its thread.

use clap::Parser as ClapParser;
use js_cli::{logging, run, Cli, TerminalHistory};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start the runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let terminal = Arc::new(TerminalHistory::stdio());
    match runtime.block_on(run(&cli, terminal)) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
