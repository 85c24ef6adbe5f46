//! Console capture
//!
//! Turns console calls made by evaluated code into history entries.

use crate::format::format_args;
use crate::table::Table;
use core_types::{ConsoleListener, ErrorInfo, HistorySink, OutputVariant, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

const DEFAULT_LABEL: &str = "default";

#[derive(Debug, Default)]
struct ConsoleState {
    counters: HashMap<String, u64>,
    timers: HashMap<String, Instant>,
    group_level: usize,
}

/// Console object state for one session.
///
/// Every console method of evaluated code ends up in [`ConsoleCapture::call`],
/// which keeps counters, timers and the group indent, and appends the
/// resulting lines to the history sink.
///
/// # Examples
///
/// ```
/// use builtins::ConsoleCapture;
/// use core_types::{HistoryEntry, MemoryHistory, OutputVariant, Value};
/// use std::sync::Arc;
///
/// let history = MemoryHistory::new();
/// let console = ConsoleCapture::new(Arc::new(history.clone()));
///
/// console.call("group", &[Value::String("outer".to_string())]);
/// console.call("count", &[]);
/// assert_eq!(
///     history.entries(),
///     vec![
///         HistoryEntry::output(OutputVariant::Info, "outer"),
///         HistoryEntry::output(OutputVariant::Info, "  default: 1"),
///     ]
/// );
/// ```
pub struct ConsoleCapture {
    sink: Arc<dyn HistorySink>,
    state: RefCell<ConsoleState>,
}

impl ConsoleCapture {
    /// Creates a console writing to `sink`.
    pub fn new(sink: Arc<dyn HistorySink>) -> Self {
        ConsoleCapture {
            sink,
            state: RefCell::new(ConsoleState::default()),
        }
    }

    /// Current group nesting.
    pub fn group_level(&self) -> usize {
        self.state.borrow().group_level
    }

    /// Drops counters, timers and group nesting.
    pub fn reset(&self) {
        *self.state.borrow_mut() = ConsoleState::default();
    }

    /// Handles one console method call.
    pub fn call(&self, method: &str, args: &[Value]) {
        trace!(method, args = args.len(), "console call");
        match method {
            "log" | "info" | "debug" | "dir" | "dirxml" => self.emit(OutputVariant::Info, &format_args(args)),
            "warn" => self.emit(OutputVariant::Warn, &format_args(args)),
            "error" => self.emit(OutputVariant::Error, &format_args(args)),
            "trace" => {
                let text = format_args(args);
                let text = if text.is_empty() {
                    "Trace".to_string()
                } else {
                    format!("Trace: {}", text)
                };
                self.emit(OutputVariant::Error, &text);
            }
            "clear" => self.sink.clear(),
            "assert" => self.assert(args),
            "count" => self.count(args),
            "countReset" => self.count_reset(args),
            "group" | "groupCollapsed" => {
                if !args.is_empty() {
                    self.emit(OutputVariant::Info, &format_args(args));
                }
                self.state.borrow_mut().group_level += 1;
            }
            "groupEnd" => {
                let mut state = self.state.borrow_mut();
                state.group_level = state.group_level.saturating_sub(1);
            }
            "table" => self.table(args),
            "time" => self.time(args),
            "timeEnd" => self.time_end(args),
            "timeLog" => self.time_log(args),
            _ => self.emit(OutputVariant::Info, &format_args(args)),
        }
    }

    /// Appends `text`, indented by the current group level on every line.
    fn emit(&self, variant: OutputVariant, text: &str) {
        let indent = "  ".repeat(self.group_level());
        let text = if indent.is_empty() {
            text.to_string()
        } else {
            text.split('\n')
                .map(|line| format!("{}{}", indent, line))
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.sink.append_output(variant, &text);
    }

    fn assert(&self, args: &[Value]) {
        if args.first().is_some_and(Value::is_truthy) {
            return;
        }
        let rest = args.get(1..).unwrap_or_default();
        let text = if rest.is_empty() {
            "Assertion failed".to_string()
        } else {
            format!("Assertion failed: {}", format_args(rest))
        };
        self.emit(OutputVariant::Error, &text);
    }

    fn count(&self, args: &[Value]) {
        let label = label(args);
        let count = {
            let mut state = self.state.borrow_mut();
            let counter = state.counters.entry(label.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        self.emit(OutputVariant::Info, &format!("{}: {}", label, count));
    }

    fn count_reset(&self, args: &[Value]) {
        let label = label(args);
        let found = match self.state.borrow_mut().counters.get_mut(&label) {
            Some(counter) => {
                *counter = 0;
                true
            }
            None => false,
        };
        if !found {
            self.emit(
                OutputVariant::Warn,
                &format!("Count for '{}' does not exist", label),
            );
        }
    }

    fn table(&self, args: &[Value]) {
        let Some(data) = args.first() else {
            return self.emit(OutputVariant::Info, "");
        };
        let properties = match args.get(1) {
            None | Some(Value::Undefined) => None,
            Some(Value::Array { items, .. }) => Some(items.iter().map(Value::render_plain).collect::<Vec<_>>()),
            Some(other) => {
                let error = ErrorInfo::new(
                    "TypeError",
                    format!(
                        "The \"properties\" argument must be an instance of Array. Received {}",
                        received(other)
                    ),
                );
                self.sink.append_error(&error);
                return;
            }
        };
        match Table::from_value(data, properties.as_deref()) {
            Some(table) => self.emit(OutputVariant::Info, &table.render()),
            None => self.emit(OutputVariant::Info, &format_args(args)),
        }
    }

    fn time(&self, args: &[Value]) {
        let label = label(args);
        let duplicate = {
            let mut state = self.state.borrow_mut();
            if state.timers.contains_key(&label) {
                true
            } else {
                state.timers.insert(label.clone(), Instant::now());
                false
            }
        };
        if duplicate {
            self.emit(
                OutputVariant::Warn,
                &format!("Label '{}' already exists for console.time()", label),
            );
        }
    }

    fn time_end(&self, args: &[Value]) {
        let label = label(args);
        let started = self.state.borrow_mut().timers.remove(&label);
        match started {
            Some(start) => self.emit(OutputVariant::Info, &format!("{}: {}", label, elapsed(start))),
            None => self.missing_timer(&label, "timeEnd"),
        }
    }

    fn time_log(&self, args: &[Value]) {
        let label = label(args);
        let started = self.state.borrow().timers.get(&label).copied();
        match started {
            Some(start) => {
                let mut text = format!("{}: {}", label, elapsed(start));
                if let Some(extra) = args.get(1..).filter(|rest| !rest.is_empty()) {
                    text.push(' ');
                    text.push_str(&format_args(extra));
                }
                self.emit(OutputVariant::Info, &text);
            }
            None => self.missing_timer(&label, "timeLog"),
        }
    }

    fn missing_timer(&self, label: &str, method: &str) {
        self.emit(
            OutputVariant::Warn,
            &format!("No such label '{}' for console.{}()", label, method),
        );
    }
}

impl ConsoleListener for ConsoleCapture {
    fn on_console(&self, method: &str, args: &[Value]) {
        self.call(method, args);
    }
}

fn label(args: &[Value]) -> String {
    match args.first() {
        None | Some(Value::Undefined) => DEFAULT_LABEL.to_string(),
        Some(value) => value.render_plain(),
    }
}

fn elapsed(start: Instant) -> String {
    format!("{:.3}ms", start.elapsed().as_secs_f64() * 1000.0)
}

/// Describes a rejected argument the way Node's argument validation does.
fn received(value: &Value) -> String {
    match value {
        Value::String(s) => format!("type string ({})", Value::String(s.clone())),
        Value::Function { name, .. } if !name.is_empty() => format!("function {}", name),
        Value::Function { .. } => "function ".to_string(),
        Value::Object { class_name: Some(name), .. } => format!("an instance of {}", name),
        Value::Object { .. } | Value::Map { .. } | Value::Set { .. } => "an instance of Object".to_string(),
        Value::Null | Value::Undefined => value.to_string(),
        other => format!("type {} ({})", other.type_of(), other),
    }
}
