//! The engine context a session evaluates in.
//!
//! A [`Sandbox`] owns one `boa` context plus the host objects installed into
//! it: `window`, the timer functions, and the capture `console` whose
//! methods forward to a [`ConsoleListener`].

use crate::error::ExecutionError;
use crate::inspect::Inspector;
use async_runtime::TimerQueue;
use boa_engine::context::ContextBuilder;
use boa_engine::native_function::NativeFunction;
use boa_engine::object::builtins::JsFunction;
use boa_engine::object::{FunctionObjectBuilder, JsObject, ObjectInitializer};
use boa_engine::property::Attribute;
use boa_engine::{js_string, Context, JsArgs, JsError, JsNativeError, JsResult, JsString, JsValue, Source};
use boa_gc::{custom_trace, empty_trace, Finalize, Trace};
use core_types::{ConsoleListener, ErrorInfo, Value};
use module_resolver::{CdnModuleLoader, HttpFetcher, ModuleSource, PRIMARY_HOST};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Console methods installed on the capture object.
pub const CONSOLE_METHODS: &[&str] = &[
    "log",
    "info",
    "debug",
    "warn",
    "error",
    "trace",
    "dir",
    "dirxml",
    "table",
    "clear",
    "assert",
    "count",
    "countReset",
    "group",
    "groupCollapsed",
    "groupEnd",
    "time",
    "timeEnd",
    "timeLog",
];

/// Timer callbacks fired per [`Sandbox::run_due_timers`] call at most.
const MAX_TIMERS_PER_TURN: usize = 1000;

/// Sandbox construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOptions {
    /// Host that bare and root-relative module specifiers resolve against
    pub cdn_host: String,
    /// Nesting depth of value snapshots
    pub inspect_depth: usize,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            cdn_host: PRIMARY_HOST.to_string(),
            inspect_depth: 2,
        }
    }
}

type ListenerSlot = Rc<RefCell<Option<Rc<dyn ConsoleListener>>>>;

#[derive(Clone)]
struct TimerTask {
    callback: JsObject,
    args: Vec<JsValue>,
}

type TimerSlot = Rc<RefCell<TimerQueue<TimerTask>>>;

fn notify(listener: &ListenerSlot, method: &str, args: &[Value]) {
    let listener = listener.borrow().clone();
    match listener {
        Some(listener) => listener.on_console(method, args),
        None => debug!(method, "console call without a listener"),
    }
}

#[derive(Finalize)]
struct ConsoleMethodCapture {
    method: &'static str,
    listener: ListenerSlot,
    inspector: Inspector,
}

// SAFETY: the only garbage-collected field is the inspector's function,
// which is marked.
unsafe impl Trace for ConsoleMethodCapture {
    custom_trace!(this, mark, {
        mark(this.inspector.function());
    });
}

#[derive(Finalize)]
struct ListenerCapture {
    listener: ListenerSlot,
}

// SAFETY: holds no garbage-collected values.
unsafe impl Trace for ListenerCapture {
    empty_trace!();
}

#[derive(Finalize)]
struct TimerCapture {
    timers: TimerSlot,
    repeat: bool,
}

// SAFETY: pending callbacks live outside the heap in the timer queue and
// stay rooted until they fire or are cleared.
unsafe impl Trace for TimerCapture {
    empty_trace!();
}

fn set_timer(_this: &JsValue, args: &[JsValue], captures: &TimerCapture, ctx: &mut Context) -> JsResult<JsValue> {
    let callback = args
        .get_or_undefined(0)
        .as_callable()
        .map(|callback| callback.clone())
        .ok_or_else(|| {
            JsNativeError::typ().with_message("The \"callback\" argument must be of type function")
        })?;
    let delay = args.get_or_undefined(1).to_number(ctx)?;
    let delay = if delay.is_finite() && delay > 0.0 {
        Duration::from_secs_f64(delay / 1000.0)
    } else {
        Duration::ZERO
    };
    let task = TimerTask {
        callback,
        args: args.get(2..).map(<[JsValue]>::to_vec).unwrap_or_default(),
    };
    let now = Instant::now();
    let mut timers = captures.timers.borrow_mut();
    let id = if captures.repeat {
        timers.set_interval(task, delay, now)
    } else {
        timers.set_timeout(task, delay, now)
    };
    Ok(JsValue::from(id))
}

fn clear_timer(_this: &JsValue, args: &[JsValue], captures: &TimerCapture, ctx: &mut Context) -> JsResult<JsValue> {
    let id = args.get_or_undefined(0).to_number(ctx)?;
    if id.is_finite() && id >= 1.0 && id <= f64::from(u32::MAX) {
        captures.timers.borrow_mut().clear(id as u32);
    }
    Ok(JsValue::undefined())
}

fn console_method(_this: &JsValue, args: &[JsValue], captures: &ConsoleMethodCapture, ctx: &mut Context) -> JsResult<JsValue> {
    let values: Vec<Value> = args
        .iter()
        .map(|arg| captures.inspector.inspect(arg, ctx))
        .collect();
    notify(&captures.listener, captures.method, &values);
    Ok(JsValue::undefined())
}

fn clear_console(_this: &JsValue, _args: &[JsValue], captures: &ListenerCapture, _ctx: &mut Context) -> JsResult<JsValue> {
    notify(&captures.listener, "clear", &[]);
    Ok(JsValue::undefined())
}

/// One engine context with its host objects.
///
/// # Examples
///
/// ```
/// use interpreter::{Sandbox, SandboxOptions};
///
/// let mut sandbox = Sandbox::new(&SandboxOptions::default()).unwrap();
/// let value = sandbox.eval("[1, 2].map(x => x * 2)").unwrap();
/// assert_eq!(sandbox.describe(&value).to_string(), "[ 2, 4 ]");
/// ```
pub struct Sandbox {
    context: Context,
    inspector: Inspector,
    listener: ListenerSlot,
    timers: TimerSlot,
    console: JsObject,
    clear: JsObject,
}

impl Sandbox {
    /// Creates a sandbox that fetches modules over HTTP.
    pub fn new(options: &SandboxOptions) -> Result<Self, ExecutionError> {
        Self::with_source(options, HttpFetcher::default())
    }

    /// Creates a sandbox that fetches modules from `source`.
    pub fn with_source<S: ModuleSource + 'static>(options: &SandboxOptions, source: S) -> Result<Self, ExecutionError> {
        let loader = Rc::new(CdnModuleLoader::new(options.cdn_host.clone(), source));
        let mut context = ContextBuilder::default()
            .module_loader(loader)
            .build()
            .map_err(|error| ErrorInfo::new("Error", error.to_string()))?;
        let inspector = Inspector::install(&mut context, options.inspect_depth)
            .map_err(|error| ErrorInfo::new("Error", error.to_string()))?;

        let listener: ListenerSlot = Rc::new(RefCell::new(None));
        let timers: TimerSlot = Rc::new(RefCell::new(TimerQueue::new()));

        let console = Self::build_console(&mut context, &listener, &inspector);
        // SAFETY: the closure captures nothing; state lives in the capture.
        let clear_fn = unsafe {
            NativeFunction::from_closure_with_captures(
                clear_console,
                ListenerCapture {
                    listener: listener.clone(),
                },
            )
        };
        let clear: JsObject = FunctionObjectBuilder::new(context.realm(), clear_fn)
            .name(js_string!("clear"))
            .length(0)
            .constructor(false)
            .build()
            .into();

        let mut sandbox = Self {
            context,
            inspector,
            listener,
            timers,
            console,
            clear,
        };
        sandbox
            .install_globals()
            .map_err(|error| sandbox.error_info(&error))?;
        debug!(cdn_host = %options.cdn_host, "sandbox ready");
        Ok(sandbox)
    }

    fn build_console(context: &mut Context, listener: &ListenerSlot, inspector: &Inspector) -> JsObject {
        let mut builder = ObjectInitializer::new(context);
        for &method in CONSOLE_METHODS {
            // SAFETY: the closure captures nothing; state lives in the capture.
            let function = unsafe {
                NativeFunction::from_closure_with_captures(
                    console_method,
                    ConsoleMethodCapture {
                        method,
                        listener: listener.clone(),
                        inspector: inspector.clone(),
                    },
                )
            };
            builder.function(function, JsString::from(method), 0);
        }
        builder.build()
    }

    fn install_globals(&mut self) -> JsResult<()> {
        let global = self.context.global_object();
        self.context
            .register_global_property(js_string!("window"), global, Attribute::all())?;
        self.context
            .register_global_property(js_string!("console"), self.console.clone(), Attribute::all())?;

        for (name, repeat) in [("setTimeout", false), ("setInterval", true)] {
            // SAFETY: the closure captures nothing; state lives in the capture.
            let function = unsafe {
                NativeFunction::from_closure_with_captures(
                    set_timer,
                    TimerCapture {
                        timers: self.timers.clone(),
                        repeat,
                    },
                )
            };
            self.context
                .register_global_builtin_callable(JsString::from(name), 2, function)?;
        }
        for name in ["clearTimeout", "clearInterval"] {
            // SAFETY: the closure captures nothing; state lives in the capture.
            let function = unsafe {
                NativeFunction::from_closure_with_captures(
                    clear_timer,
                    TimerCapture {
                        timers: self.timers.clone(),
                        repeat: false,
                    },
                )
            };
            self.context
                .register_global_builtin_callable(JsString::from(name), 1, function)?;
        }
        Ok(())
    }

    /// Registers the listener that receives console calls.
    pub fn set_listener(&self, listener: Rc<dyn ConsoleListener>) {
        *self.listener.borrow_mut() = Some(listener);
    }

    /// The capture console object.
    pub fn console(&self) -> &JsObject {
        &self.console
    }

    /// The `clear()` helper passed to every submission.
    pub fn clear_helper(&self) -> &JsObject {
        &self.clear
    }

    /// The underlying engine context.
    pub fn context(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Evaluates a script in the global scope.
    pub fn eval(&mut self, code: &str) -> Result<JsValue, ExecutionError> {
        let result = self.context.eval(Source::from_bytes(code));
        result.map_err(|error| ExecutionError::Thrown(self.error_info(&error)))
    }

    /// Compiles `source`, which must evaluate to a function.
    pub fn compile_function(&mut self, source: &str) -> Result<JsFunction, ExecutionError> {
        let value = self.eval(source)?;
        value
            .as_object()
            .and_then(|object| JsFunction::from_object(object.clone()))
            .ok_or_else(|| ExecutionError::Thrown(ErrorInfo::new("TypeError", "compiled source is not a function")))
    }

    /// Calls `function` with `args` and an undefined receiver.
    pub fn call(&mut self, function: &JsFunction, args: &[JsValue]) -> Result<JsValue, ExecutionError> {
        let result = function.call(&JsValue::undefined(), args, &mut self.context);
        result.map_err(|error| ExecutionError::Thrown(self.error_info(&error)))
    }

    /// Snapshots a value.
    pub fn describe(&mut self, value: &JsValue) -> Value {
        self.inspector.inspect(value, &mut self.context)
    }

    /// The error info of an engine error.
    pub fn error_info(&mut self, error: &JsError) -> ErrorInfo {
        self.inspector.error_info(error, &mut self.context)
    }

    /// The error info of a thrown (or rejected) value.
    pub fn thrown(&mut self, value: &JsValue) -> ErrorInfo {
        self.inspector.thrown(value, &mut self.context)
    }

    fn report_uncaught(&mut self, error: &JsError) {
        let info = self.error_info(error);
        warn!(%info, "uncaught error outside a submission");
        notify(&self.listener, "error", &[Value::Error(info)]);
    }

    /// Runs queued promise jobs. Errors escaping a job go to the listener.
    pub fn run_jobs(&mut self) {
        if let Err(error) = self.context.run_jobs() {
            self.report_uncaught(&error);
        }
    }

    /// Fires every timer due now, running jobs after each callback.
    ///
    /// Returns the number of callbacks fired.
    pub fn run_due_timers(&mut self) -> usize {
        let now = Instant::now();
        let mut fired = 0;
        while fired < MAX_TIMERS_PER_TURN {
            let due = self.timers.borrow_mut().pop_due(now);
            let Some(due) = due else {
                break;
            };
            fired += 1;
            let result = due
                .payload
                .callback
                .call(&JsValue::undefined(), &due.payload.args, &mut self.context);
            if let Err(error) = result {
                self.report_uncaught(&error);
            }
            self.run_jobs();
        }
        fired
    }

    /// The earliest pending timer deadline.
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.borrow().next_deadline()
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Drops every pending timer.
    pub fn clear_timers(&self) {
        self.timers.borrow_mut().clear_all();
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("inspect_depth", &self.inspector.depth())
            .field("pending_timers", &self.pending_timers())
            .finish_non_exhaustive()
    }
}
