//! The console listener contract.

use crate::value::Value;

/// Receives every console call made by evaluated code.
///
/// `method` is the console method name (`log`, `table`, ...) and `args` are
/// snapshots of the call's arguments.
pub trait ConsoleListener {
    /// Handles one console call.
    fn on_console(&self, method: &str, args: &[Value]);
}

impl<F> ConsoleListener for F
where
    F: Fn(&str, &[Value]),
{
    fn on_console(&self, method: &str, args: &[Value]) {
        self(method, args)
    }
}
