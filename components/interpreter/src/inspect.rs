//! Converting live engine values into [`Value`] snapshots.
//!
//! The description itself runs inside the engine (`prelude.js`), which
//! walks the value with ordinary property access and returns a JSON string.
//! The JSON is decoded here with `serde`.

use boa_engine::builtins::function::OrdinaryFunction;
use boa_engine::native_function::NativeFunction;
use boa_engine::object::builtins::JsFunction;
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::{js_string, Context, JsArgs, JsError, JsResult, JsValue, Source};
use core_types::{ErrorInfo, Value};
use serde::Deserialize;
use tracing::debug;

const PRELUDE: &str = include_str!("prelude.js");

/// Wire form produced by the prelude.
#[derive(Debug, Deserialize)]
#[serde(tag = "t", rename_all = "lowercase")]
enum Described {
    Undefined,
    Null,
    Boolean {
        v: bool,
    },
    Number {
        v: String,
    },
    Bigint {
        v: String,
    },
    String {
        v: String,
    },
    Symbol {
        v: String,
    },
    Function {
        name: String,
        cls: bool,
    },
    Array {
        items: Vec<Described>,
        more: usize,
    },
    Object {
        cls: Option<String>,
        entries: Vec<(String, Described)>,
        more: usize,
    },
    Map {
        entries: Vec<(Described, Described)>,
        size: usize,
    },
    Set {
        items: Vec<Described>,
        size: usize,
    },
    Error {
        name: String,
        message: String,
    },
    Date {
        v: String,
    },
    Regexp {
        v: String,
    },
    Circular,
    Truncated {
        kind: String,
    },
}

fn parse_number(text: &str) -> f64 {
    match text {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        "-0" => -0.0,
        other => other.parse().unwrap_or(f64::NAN),
    }
}

impl From<Described> for Value {
    fn from(described: Described) -> Self {
        match described {
            Described::Undefined => Value::Undefined,
            Described::Null => Value::Null,
            Described::Boolean { v } => Value::Boolean(v),
            Described::Number { v } => Value::Number(parse_number(&v)),
            Described::Bigint { v } => Value::BigInt(v),
            Described::String { v } => Value::String(v),
            Described::Symbol { v } => Value::Symbol(v),
            Described::Function { name, cls } => Value::Function {
                name,
                is_class: cls,
            },
            Described::Array { items, more } => Value::Array {
                items: items.into_iter().map(Value::from).collect(),
                more,
            },
            Described::Object { cls, entries, more } => Value::Object {
                class_name: cls,
                entries: entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
                more,
            },
            Described::Map { entries, size } => Value::Map {
                entries: entries
                    .into_iter()
                    .map(|(key, value)| (Value::from(key), Value::from(value)))
                    .collect(),
                size,
            },
            Described::Set { items, size } => Value::Set {
                items: items.into_iter().map(Value::from).collect(),
                size,
            },
            Described::Error { name, message } => Value::Error(ErrorInfo::new(name, message)),
            Described::Date { v } => Value::Date(v),
            Described::Regexp { v } => Value::RegExp(v),
            Described::Circular => Value::Circular,
            Described::Truncated { kind } => Value::Truncated(kind),
        }
    }
}

fn as_function(value: JsValue) -> Result<JsFunction, JsError> {
    value
        .as_object()
        .and_then(JsFunction::from_object)
        .ok_or_else(|| JsError::from_opaque(JsValue::from(js_string!("value prelude did not produce a function"))))
}

/// True for functions compiled from source, false for builtins, bound
/// functions and proxies.
///
/// Together with a read-only `prototype` this identifies class constructors;
/// `Function.prototype.toString` can't, as the engine doesn't keep source text.
fn is_compiled_function(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
    let compiled = args
        .get_or_undefined(0)
        .as_object()
        .is_some_and(|object| object.is::<OrdinaryFunction>());
    Ok(compiled.into())
}

/// Describes engine values at a fixed depth.
#[derive(Debug, Clone)]
pub struct Inspector {
    function: JsFunction,
    depth: usize,
}

impl Inspector {
    /// Evaluates the prelude in `context`.
    pub fn install(context: &mut Context, depth: usize) -> Result<Self, JsError> {
        let factory = as_function(context.eval(Source::from_bytes(PRELUDE))?)?;
        let compiled = FunctionObjectBuilder::new(context.realm(), NativeFunction::from_fn_ptr(is_compiled_function))
            .name(js_string!("isCompiledFunction"))
            .length(1)
            .build();
        let function = as_function(factory.call(&JsValue::undefined(), &[compiled.into()], context)?)?;
        Ok(Self { function, depth })
    }

    pub(crate) fn function(&self) -> &JsFunction {
        &self.function
    }

    /// Nesting depth below which containers are truncated.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Snapshots `value`.
    ///
    /// Never fails: if the prelude throws (a hostile proxy, say) the value
    /// falls back to the engine's own display form.
    pub fn inspect(&self, value: &JsValue, context: &mut Context) -> Value {
        let depth = JsValue::from(self.depth as u32);
        let described = self
            .function
            .call(&JsValue::undefined(), &[value.clone(), depth], context)
            .ok()
            .and_then(|json| json.as_string().map(|s| s.to_std_string_escaped()))
            .and_then(|json| serde_json::from_str::<Described>(&json).ok());
        match described {
            Some(described) => Value::from(described),
            None => {
                debug!("value description failed, using display form");
                Value::String(value.display().to_string())
            }
        }
    }

    /// The error info of a thrown value.
    ///
    /// Error objects keep their name and message; anything else is reported
    /// as `Uncaught: <rendered value>`.
    pub fn thrown(&self, value: &JsValue, context: &mut Context) -> ErrorInfo {
        match self.inspect(value, context) {
            Value::Error(info) => info,
            other => ErrorInfo::new("Uncaught", other.to_string()),
        }
    }

    /// The error info of an engine error.
    pub fn error_info(&self, error: &JsError, context: &mut Context) -> ErrorInfo {
        let opaque = error.to_opaque(context);
        self.thrown(&opaque, context)
    }
}
