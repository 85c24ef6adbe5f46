//! Detached snapshots of JavaScript values.
//!
//! The engine owns live values; everything that has to be rendered (REPL
//! results, console arguments, tables) is first converted into a [`Value`]
//! snapshot. Snapshots are plain Rust data: they can be inspected, compared
//! and formatted without access to the engine that produced them.

use crate::error::ErrorInfo;
use std::fmt;

/// A depth-limited description of a JavaScript value.
///
/// Containers hold at most a bounded number of children; the number of
/// omitted children is kept in the `more` fields so that rendering can say
/// how much was left out.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::Number(42.0);
/// assert!(number.is_truthy());
/// assert_eq!(number.type_of(), "number");
/// assert_eq!(number.to_string(), "42");
///
/// let text = Value::String("hi".to_string());
/// assert_eq!(text.to_string(), "'hi'");
/// assert_eq!(text.render_plain(), "hi");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// A boolean primitive
    Boolean(bool),
    /// A number primitive
    Number(f64),
    /// A BigInt primitive, kept as its decimal digits
    BigInt(String),
    /// A string primitive
    String(String),
    /// A symbol, kept as its description
    Symbol(String),
    /// A function or class
    Function {
        /// The function's `name` property (may be empty)
        name: String,
        /// Whether the function is a class constructor
        is_class: bool,
    },
    /// An array
    Array {
        /// Leading elements
        items: Vec<Value>,
        /// Number of elements not captured
        more: usize,
    },
    /// Any other object, described by its own enumerable properties
    Object {
        /// Name of the constructor, `None` for plain or null-prototype objects
        class_name: Option<String>,
        /// Own enumerable string-keyed properties
        entries: Vec<(String, Value)>,
        /// Number of properties not captured
        more: usize,
    },
    /// A `Map`
    Map {
        /// Leading key/value pairs
        entries: Vec<(Value, Value)>,
        /// The map's `size`
        size: usize,
    },
    /// A `Set`
    Set {
        /// Leading members
        items: Vec<Value>,
        /// The set's `size`
        size: usize,
    },
    /// An `Error` instance
    Error(ErrorInfo),
    /// A `Date`, as its ISO string
    Date(String),
    /// A `RegExp`, as its source form
    RegExp(String),
    /// A reference back to an object already being described
    Circular,
    /// An object beyond the description depth, labelled by its kind
    Truncated(String),
}

impl Value {
    /// Returns whether this value is truthy in JavaScript semantics.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Undefined.is_truthy());
    /// assert!(!Value::Number(0.0).is_truthy());
    /// assert!(!Value::Number(f64::NAN).is_truthy());
    /// assert!(!Value::String(String::new()).is_truthy());
    /// assert!(Value::Array { items: vec![], more: 0 }.is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_nan() && *n != 0.0,
            Value::BigInt(digits) => digits.trim_start_matches('-') != "0",
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Returns the JavaScript `typeof` result for this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function { .. } => "function",
            _ => "object",
        }
    }

    /// Returns true for values that are not objects.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined
                | Value::Null
                | Value::Boolean(_)
                | Value::Number(_)
                | Value::BigInt(_)
                | Value::String(_)
                | Value::Symbol(_)
        )
    }

    /// Returns the string contents if this is a string primitive.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value the way `console.log` prints a top-level argument:
    /// strings appear without quotes, everything else as in [`fmt::Display`].
    pub fn render_plain(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Renders a short label for the value's runtime type, e.g. `number`,
    /// `Array(3)`, `Map(1)`, `class Foo` or `Point`.
    pub fn describe_type(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Function { name, is_class } => match (is_class, name.is_empty()) {
                (true, true) => "class".to_string(),
                (true, false) => format!("class {}", name),
                (false, _) => "function".to_string(),
            },
            Value::Array { items, more } => format!("Array({})", items.len() + more),
            Value::Object { class_name, .. } => {
                class_name.clone().unwrap_or_else(|| "Object".to_string())
            }
            Value::Map { size, .. } => format!("Map({})", size),
            Value::Set { size, .. } => format!("Set({})", size),
            Value::Error(info) => info.name.clone(),
            Value::Date(_) => "Date".to_string(),
            Value::RegExp(_) => "RegExp".to_string(),
            Value::Circular | Value::Truncated(_) => "object".to_string(),
            other => other.type_of().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::BigInt(digits) => write!(f, "{}n", digits),
            Value::String(s) => write!(f, "{}", quote_string(s)),
            Value::Symbol(description) => write!(f, "Symbol({})", description),
            Value::Function { name, is_class } => {
                let name = if name.is_empty() { "(anonymous)" } else { name };
                if *is_class {
                    write!(f, "[class {}]", name)
                } else if name == "(anonymous)" {
                    write!(f, "[Function {}]", name)
                } else {
                    write!(f, "[Function: {}]", name)
                }
            }
            Value::Array { items, more } => {
                let mut parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                if *more > 0 {
                    parts.push(more_items(*more));
                }
                write_braced(f, "[", "]", &parts)
            }
            Value::Object {
                class_name,
                entries,
                more,
            } => {
                if let Some(name) = class_name.as_deref().filter(|name| *name != "Object") {
                    write!(f, "{} ", name)?;
                }
                let mut parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", format_key(key), value))
                    .collect();
                if *more > 0 {
                    parts.push(more_items(*more));
                }
                write_braced(f, "{", "}", &parts)
            }
            Value::Map { entries, size } => {
                write!(f, "Map({}) ", size)?;
                let mut parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{} => {}", key, value))
                    .collect();
                if *size > entries.len() {
                    parts.push(more_items(size - entries.len()));
                }
                write_braced(f, "{", "}", &parts)
            }
            Value::Set { items, size } => {
                write!(f, "Set({}) ", size)?;
                let mut parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                if *size > items.len() {
                    parts.push(more_items(size - items.len()));
                }
                write_braced(f, "{", "}", &parts)
            }
            Value::Error(info) => write!(f, "{}", info),
            Value::Date(iso) => write!(f, "{}", iso),
            Value::RegExp(source) => write!(f, "{}", source),
            Value::Circular => write!(f, "[Circular]"),
            Value::Truncated(kind) => write!(f, "[{}]", kind),
        }
    }
}

fn write_braced(f: &mut fmt::Formatter<'_>, open: &str, close: &str, parts: &[String]) -> fmt::Result {
    if parts.is_empty() {
        write!(f, "{}{}", open, close)
    } else {
        write!(f, "{} {} {}", open, parts.join(", "), close)
    }
}

fn more_items(count: usize) -> String {
    if count == 1 {
        "... 1 more item".to_string()
    } else {
        format!("... {} more items", count)
    }
}

/// Formats a property key, quoting it unless it is a valid identifier.
fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if is_identifier {
        key.to_string()
    } else {
        quote_string(key)
    }
}

/// Quotes a string the way Node's inspector does: single quotes by default,
/// double quotes or backticks when that avoids escaping.
///
/// # Examples
///
/// ```
/// use core_types::value::quote_string;
///
/// assert_eq!(quote_string("abc"), "'abc'");
/// assert_eq!(quote_string("it's"), "\"it's\"");
/// assert_eq!(quote_string("a\nb"), "'a\\nb'");
/// ```
pub fn quote_string(s: &str) -> String {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') && !s.contains("${") {
        '`'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Formats a number with the ECMAScript Number-to-String algorithm, except
/// that negative zero is shown as `-0` the way the inspector shows it.
///
/// # Examples
///
/// ```
/// use core_types::value::format_number;
///
/// assert_eq!(format_number(20.0), "20");
/// assert_eq!(format_number(0.1), "0.1");
/// assert_eq!(format_number(1e21), "1e+21");
/// assert_eq!(format_number(1e-7), "1e-7");
/// assert_eq!(format_number(-0.0), "-0");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if n < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-tripping digits, e.g. "1.2345e3".
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let e_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, e_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}
