//! Core types shared by the sandbox crates.
//!
//! This crate provides the data the rest of the workspace exchanges:
//! detached value snapshots, error descriptions, the history model and the
//! contracts through which a session reports output.
//!
//! # Overview
//!
//! - [`Value`] - Depth-limited snapshot of a JavaScript value
//! - [`ErrorInfo`] / [`ErrorKind`] - JavaScript errors as displayed
//! - [`HistoryEntry`] / [`HistorySink`] - REPL history and its destination
//! - [`ConsoleListener`] - Receiver of captured console calls
//! - [`SourcePosition`] - Source code location
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorInfo, HistorySink, MemoryHistory, OutputVariant, Value};
//!
//! let history = MemoryHistory::new();
//! history.append_output(OutputVariant::Info, &Value::Number(42.0).to_string());
//! history.append_error(&ErrorInfo::new("ReferenceError", "y is not defined"));
//! assert_eq!(history.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod history;
mod listener;
mod source;
pub mod value;

pub use error::{ErrorInfo, ErrorKind};
pub use history::{HistoryEntry, HistorySink, MemoryHistory, OutputVariant, EXECUTION_CANCELLED};
pub use listener::ConsoleListener;
pub use source::SourcePosition;
pub use value::Value;
