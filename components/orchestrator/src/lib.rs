//! Execution orchestration for the REPL
//!
//! A [`Session`] drives the execution engine through its lifecycle:
//! - `Idle → Loading → Idle`: engine context creation and CDN probe
//! - `Idle ⇄ Executing`: one submission at a time, raced against an abort token
//! - Recovery of a saved history, re-running what succeeded
//! - Meta-commands such as `:bindings` and `:type <name>`
//!
//! Everything a submission shows ends up in a [`core_types::HistorySink`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod meta;
pub mod recovery;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use error::SessionError;
pub use meta::{is_meta_command, MetaCommand, HELP};
pub use recovery::{parse_history, plan_recovery, RecoveryStep};
pub use session::{ExecutionOutcome, RecoveryReport, Session};
pub use state::{SessionController, SessionState};
