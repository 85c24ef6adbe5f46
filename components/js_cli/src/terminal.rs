//! A history sink that prints as it records.

use core_types::{HistoryEntry, HistorySink, MemoryHistory, OutputVariant};
use parking_lot::Mutex;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

type Output = Box<dyn Write + Send>;

/// Prints every entry to the terminal and keeps a copy for `--save`.
///
/// Info output goes to stdout; warnings, errors and error output go to
/// stderr. Inputs are only echoed while echo is on (during recovery), since
/// an interactive user has just typed them.
pub struct TerminalHistory {
    out: Mutex<Output>,
    err: Mutex<Output>,
    record: MemoryHistory,
    echo_input: AtomicBool,
    clear_screen: bool,
}

impl TerminalHistory {
    /// Prints to the process's stdout and stderr.
    pub fn stdio() -> Self {
        let clear_screen = std::io::stdout().is_terminal();
        let mut history = Self::with_writers(Box::new(std::io::stdout()), Box::new(std::io::stderr()));
        history.clear_screen = clear_screen;
        history
    }

    /// Prints to the given writers.
    pub fn with_writers(out: Output, err: Output) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            record: MemoryHistory::new(),
            echo_input: AtomicBool::new(false),
            clear_screen: false,
        }
    }

    /// Turns echoing of input entries on or off.
    pub fn set_echo(&self, echo: bool) {
        self.echo_input.store(echo, Ordering::Relaxed);
    }

    /// Entries recorded so far.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.record.entries()
    }

    /// The recorded history as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.record.entries())
    }

    fn print(&self, entry: &HistoryEntry) {
        // A closed stdout must not bring the session down.
        let _ = match entry {
            HistoryEntry::Input { code } => {
                if !self.echo_input.load(Ordering::Relaxed) {
                    return;
                }
                writeln!(self.out.lock(), "{}", prompted(code))
            }
            HistoryEntry::Output {
                variant: OutputVariant::Info,
                text,
            } => writeln!(self.out.lock(), "{}", text),
            HistoryEntry::Output { text, .. } => writeln!(self.err.lock(), "{}", text),
            HistoryEntry::Error { name, message } => writeln!(self.err.lock(), "{}: {}", name, message),
            HistoryEntry::RecoveredMark => writeln!(self.out.lock(), "-- history recovered --"),
        };
    }
}

fn prompted(code: &str) -> String {
    let mut text = String::new();
    for (i, line) in code.lines().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(if i == 0 { "> " } else { "... " });
        text.push_str(line);
    }
    text
}

impl HistorySink for TerminalHistory {
    fn append(&self, entry: HistoryEntry) {
        self.print(&entry);
        self.record.append(entry);
    }

    fn clear(&self) {
        self.record.clear();
        if self.clear_screen {
            let mut out = self.out.lock();
            let _ = write!(out, "\x1B[2J\x1B[1;1H");
            let _ = out.flush();
        }
    }
}

impl std::fmt::Debug for TerminalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalHistory")
            .field("entries", &self.record.len())
            .field("echo_input", &self.echo_input)
            .finish_non_exhaustive()
    }
}
