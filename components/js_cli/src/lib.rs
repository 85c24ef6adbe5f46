//! Terminal front-end for the REPL sandbox
//!
//! Parses the command line, sets up logging and runs a
//! [`orchestrator::Session`] that prints its history as it grows.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod repl;
pub mod run;
pub mod terminal;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use run::{run, Status};
pub use terminal::TerminalHistory;
