//! The REPL history model and the sink contract.
//!
//! A session never renders anything itself: every user-visible effect is an
//! entry appended to a [`HistorySink`]. Entries serialize to tagged JSON so a
//! front-end can persist a history and later hand it back for recovery.

use crate::error::ErrorInfo;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Info text emitted when a running submission is aborted.
pub const EXECUTION_CANCELLED: &str = "Execution cancelled";

/// Severity of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputVariant {
    /// Regular output (results, `console.log`)
    Info,
    /// Warnings (`console.warn`, counter/timer misuse)
    Warn,
    /// Error output (`console.error`, failed assertions)
    Error,
}

/// One entry of the REPL history.
///
/// # Examples
///
/// ```
/// use core_types::{HistoryEntry, OutputVariant};
///
/// let entry = HistoryEntry::output(OutputVariant::Info, "2");
/// let json = serde_json::to_string(&entry).unwrap();
/// assert_eq!(json, r#"{"type":"output","variant":"info","text":"2"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryEntry {
    /// A submission as typed by the user
    Input {
        /// Source text of the submission
        code: String,
    },
    /// A line of output
    Output {
        /// Output severity
        variant: OutputVariant,
        /// Rendered text
        text: String,
    },
    /// An uncaught error
    Error {
        /// Error constructor name
        name: String,
        /// Error message
        message: String,
    },
    /// Marks the end of a recovered history
    RecoveredMark,
}

impl HistoryEntry {
    /// Creates an input entry.
    pub fn input(code: impl Into<String>) -> Self {
        HistoryEntry::Input { code: code.into() }
    }

    /// Creates an output entry.
    pub fn output(variant: OutputVariant, text: impl Into<String>) -> Self {
        HistoryEntry::Output {
            variant,
            text: text.into(),
        }
    }

    /// Creates an error entry.
    pub fn error(error: &ErrorInfo) -> Self {
        HistoryEntry::Error {
            name: error.name.clone(),
            message: error.message.clone(),
        }
    }

    /// Returns true for the info entry emitted by an abort.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            HistoryEntry::Output { variant: OutputVariant::Info, text } if text == EXECUTION_CANCELLED
        )
    }
}

/// Destination of everything a session displays.
pub trait HistorySink: Send + Sync {
    /// Appends an entry.
    fn append(&self, entry: HistoryEntry);

    /// Removes all entries.
    fn clear(&self);

    /// Appends an input entry.
    fn append_input(&self, code: &str) {
        self.append(HistoryEntry::input(code));
    }

    /// Appends an output entry.
    fn append_output(&self, variant: OutputVariant, text: &str) {
        self.append(HistoryEntry::output(variant, text));
    }

    /// Appends an error entry.
    fn append_error(&self, error: &ErrorInfo) {
        self.append(HistoryEntry::error(error));
    }
}

/// An in-memory history, cheap to clone (clones share the same entries).
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl MemoryHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current entries.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().clone()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes and returns all entries.
    pub fn take(&self) -> Vec<HistoryEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl HistorySink for MemoryHistory {
    fn append(&self, entry: HistoryEntry) {
        self.entries.lock().push(entry);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}
