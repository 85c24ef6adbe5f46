//! The execution engine: one submission in, bindings and a result out.

use crate::binding::BindingContext;
use crate::error::ExecutionError;
use crate::sandbox::Sandbox;
use crate::synthesize::{synthesize, SynthesizedBody, BINDINGS_KEY, RESULT_NAME};
use async_runtime::AbortToken;
use boa_engine::builtins::promise::PromiseState;
use boa_engine::object::JsObject;
use boa_engine::{JsString, JsValue};
use core_types::{ErrorInfo, Value};
use module_resolver::ImportRewriter;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default interval between polls of a pending async submission.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs submissions against a sandbox and a binding context.
///
/// # Examples
///
/// ```
/// use interpreter::{ExecutionEngine, Sandbox, SandboxOptions};
/// use core_types::Value;
///
/// let sandbox = Sandbox::new(&SandboxOptions::default()).unwrap();
/// let mut engine = ExecutionEngine::new(sandbox, "cdn.jsdelivr.net");
/// let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
///
/// assert_eq!(runtime.block_on(engine.execute("const a = 10;")).unwrap(), None);
/// assert_eq!(runtime.block_on(engine.execute("a * 2")).unwrap(), Some(Value::Number(20.0)));
/// ```
pub struct ExecutionEngine {
    sandbox: Sandbox,
    bindings: BindingContext,
    rewriter: ImportRewriter,
    poll_interval: Duration,
}

impl ExecutionEngine {
    /// Creates an engine whose imports resolve against `cdn_host`.
    pub fn new(sandbox: Sandbox, cdn_host: &str) -> Self {
        Self {
            sandbox,
            bindings: BindingContext::new(),
            rewriter: ImportRewriter::execution(cdn_host),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets how often a pending async submission is polled.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// The binding context.
    pub fn bindings(&self) -> &BindingContext {
        &self.bindings
    }

    /// The binding context, for subscribing observers.
    pub fn bindings_mut(&mut self) -> &mut BindingContext {
        &mut self.bindings
    }

    /// The sandbox.
    pub fn sandbox(&mut self) -> &mut Sandbox {
        &mut self.sandbox
    }

    /// Executes one submission.
    ///
    /// Returns the trailing expression's value, if any. On error the binding
    /// context is left untouched. The returned future may be dropped at any
    /// `await` point; that also leaves the bindings untouched.
    pub async fn execute(&mut self, code: &str) -> Result<Option<Value>, ExecutionError> {
        self.execute_abortable(code, &AbortToken::new()).await
    }

    /// Executes one submission unless `token` is aborted first.
    ///
    /// The token is committed just before the bindings are updated. An abort
    /// that lands earlier, even while synchronous code is still running,
    /// fails the submission with [`ExecutionError::Cancelled`] and leaves the
    /// bindings untouched.
    pub async fn execute_abortable(&mut self, code: &str, token: &AbortToken) -> Result<Option<Value>, ExecutionError> {
        let rewritten = self.rewriter.rewrite(code)?;
        let statements = parser::analyze(&rewritten)?;
        let synthesized = synthesize(&statements, &self.bindings.names());
        let args = self.arguments(&synthesized);

        let returned = match self.sandbox.compile_function(&synthesized.source(false)) {
            Ok(function) => {
                let returned = self.sandbox.call(&function, &args)?;
                self.sandbox.run_jobs();
                returned
            }
            Err(error) if error.is_syntax() => {
                debug!(%error, "synchronous compile failed, retrying as async");
                let function = self
                    .sandbox
                    .compile_function(&synthesized.source(true))
                    .map_err(without_wrapper_position)?;
                let promise = self.sandbox.call(&function, &args)?;
                self.settle(promise, token).await?
            }
            Err(error) => return Err(error),
        };

        self.reconcile(&returned, &synthesized, token)
    }

    fn arguments(&self, synthesized: &SynthesizedBody) -> Vec<JsValue> {
        synthesized
            .params
            .iter()
            .map(|param| match (self.bindings.get(param), param.as_str()) {
                (Some(value), _) => value.clone(),
                (None, "console") => JsValue::from(self.sandbox.console().clone()),
                (None, "clear") => JsValue::from(self.sandbox.clear_helper().clone()),
                (None, _) => JsValue::undefined(),
            })
            .collect()
    }

    /// Drives the promise of an async submission to settlement.
    async fn settle(&mut self, value: JsValue, token: &AbortToken) -> Result<JsValue, ExecutionError> {
        let Some(promise) = value.as_promise() else {
            return Ok(value);
        };
        loop {
            if token.is_aborted() {
                return Err(ExecutionError::Cancelled);
            }
            self.sandbox.run_jobs();
            match promise.state() {
                PromiseState::Fulfilled(value) => return Ok(value),
                PromiseState::Rejected(reason) => {
                    return Err(ExecutionError::Thrown(self.sandbox.thrown(&reason)))
                }
                PromiseState::Pending => {}
            }
            if self.sandbox.run_due_timers() > 0 {
                continue;
            }
            let wait = self
                .sandbox
                .next_timer_deadline()
                .map_or(self.poll_interval, |deadline| {
                    deadline.saturating_duration_since(Instant::now())
                })
                .min(self.poll_interval);
            trace!(?wait, "submission pending");
            tokio::time::sleep(wait).await;
        }
    }

    fn property(&mut self, object: &JsObject, key: &str) -> Result<JsValue, ExecutionError> {
        let result = object.get(JsString::from(key), self.sandbox.context());
        result.map_err(|error| ExecutionError::Thrown(self.sandbox.error_info(&error)))
    }

    fn reconcile(
        &mut self,
        returned: &JsValue,
        synthesized: &SynthesizedBody,
        token: &AbortToken,
    ) -> Result<Option<Value>, ExecutionError> {
        let Some(object) = returned.as_object() else {
            return commit(token).map(|()| None);
        };
        let marked = object.has_own_property(JsString::from(BINDINGS_KEY), self.sandbox.context());
        let marked = marked.map_err(|error| ExecutionError::Thrown(self.sandbox.error_info(&error)))?;
        if !marked {
            debug!("submission returned early; bindings not reconciled");
            return commit(token).map(|()| None);
        }

        let exported = self.property(&object, BINDINGS_KEY)?;
        let result = self.property(&object, RESULT_NAME)?;
        let mut updates = Vec::with_capacity(synthesized.names.len());
        if let Some(exported) = exported.as_object() {
            for name in &synthesized.names {
                updates.push((name.clone(), self.property(&exported, name)?));
            }
        }

        // Every read above can throw (getters); nothing is applied until all succeeded.
        commit(token)?;
        let changed = self.bindings.apply(updates);
        if !changed.is_empty() {
            debug!(?changed, "bindings updated");
        }

        Ok(synthesized.has_result.then(|| self.sandbox.describe(&result)))
    }

    /// Fires due timers and runs pending jobs outside any submission.
    ///
    /// Returns the number of timer callbacks fired.
    pub fn pump(&mut self) -> usize {
        self.sandbox.run_jobs();
        self.sandbox.run_due_timers()
    }

    /// Snapshot of one binding.
    pub fn describe_binding(&mut self, name: &str) -> Option<Value> {
        let value = self.bindings.get(name)?.clone();
        Some(self.sandbox.describe(&value))
    }

    /// Drops every binding and pending timer.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.sandbox.clear_timers();
    }
}

fn commit(token: &AbortToken) -> Result<(), ExecutionError> {
    if token.commit() {
        Ok(())
    } else {
        debug!("submission aborted; bindings not reconciled");
        Err(ExecutionError::Cancelled)
    }
}

/// Drops the `at line N, col M` suffix of a syntax error raised while
/// compiling the async wrapper, whose positions don't match the submission.
fn without_wrapper_position(error: ExecutionError) -> ExecutionError {
    match error {
        ExecutionError::Thrown(info) if info.is_syntax() => {
            let message = strip_position(&info.message).to_string();
            ExecutionError::Thrown(ErrorInfo::new(info.name, message))
        }
        other => other,
    }
}

fn strip_position(message: &str) -> &str {
    let Some(at) = message.rfind(" at line ") else {
        return message;
    };
    let position = &message[at + " at line ".len()..];
    let is_position = position.split_once(", col ").is_some_and(|(line, col)| {
        !line.is_empty()
            && !col.is_empty()
            && line.bytes().all(|b| b.is_ascii_digit())
            && col.bytes().all(|b| b.is_ascii_digit())
    });
    if is_position {
        &message[..at]
    } else {
        message
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("bindings", &self.bindings)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_position() {
        assert_eq!(
            strip_position("unexpected token 'const', primary expression at line 2, col 21"),
            "unexpected token 'const', primary expression"
        );
        assert_eq!(strip_position("abrupt end"), "abrupt end");
        assert_eq!(strip_position("look at line one"), "look at line one");
    }
}
