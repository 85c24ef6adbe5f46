//! Console capture for the sandbox
//!
//! This crate provides what evaluated code sees as `console`, minus the
//! engine glue:
//! - argument formatting with `%s %d %i %f %o %O %j %c %%`
//! - per-label counters and timers
//! - group indentation
//! - box-drawn `console.table` output
//!
//! # Example
//!
//! ```
//! use builtins::ConsoleCapture;
//! use core_types::{HistoryEntry, MemoryHistory, OutputVariant, Value};
//! use std::sync::Arc;
//!
//! let history = MemoryHistory::new();
//! let console = ConsoleCapture::new(Arc::new(history.clone()));
//!
//! console.call("warn", &[Value::String("%d left".to_string()), Value::Number(3.0)]);
//! assert_eq!(
//!     history.entries(),
//!     vec![HistoryEntry::output(OutputVariant::Warn, "3 left")]
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod format;
pub mod table;

pub use console::ConsoleCapture;
pub use format::format_args;
pub use table::Table;
