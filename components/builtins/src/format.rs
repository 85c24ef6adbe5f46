//! `util.format`-style rendering of console arguments.

use core_types::value::format_number;
use core_types::Value;

/// Renders console arguments into one line of text.
///
/// A leading string argument is a format string: `%s %d %i %f %o %O %j %c`
/// each consume one argument and `%%` is a literal percent sign. Arguments
/// left over are appended separated by spaces; top-level strings are shown
/// raw, everything else the way the inspector shows it.
///
/// # Examples
///
/// ```
/// use builtins::format_args;
/// use core_types::Value;
///
/// let args = vec![
///     Value::String("%s has %d items".to_string()),
///     Value::String("cart".to_string()),
///     Value::Number(3.0),
///     Value::Boolean(true),
/// ];
/// assert_eq!(format_args(&args), "cart has 3 items true");
/// ```
pub fn format_args(args: &[Value]) -> String {
    let Some((first, rest)) = args.split_first() else {
        return String::new();
    };

    let (mut out, rest) = match first {
        Value::String(template) if template.contains('%') => apply_template(template, rest),
        other => (other.render_plain(), rest),
    };
    for arg in rest {
        out.push(' ');
        out.push_str(&arg.render_plain());
    }
    out
}

fn apply_template<'a>(template: &str, args: &'a [Value]) -> (String, &'a [Value]) {
    let mut out = String::with_capacity(template.len());
    let mut next = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&spec) = chars.peek() else {
            out.push('%');
            break;
        };
        if spec == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !"sdifoOjc".contains(spec) {
            out.push('%');
            continue;
        }
        let Some(arg) = args.get(next) else {
            out.push('%');
            continue;
        };
        chars.next();
        next += 1;
        match spec {
            's' => out.push_str(&format_string(arg)),
            'd' => out.push_str(&format_integral(arg, false)),
            'i' => out.push_str(&format_integral(arg, true)),
            'f' => out.push_str(&format_number(parse_float(arg))),
            'j' => out.push_str(&to_json(arg)),
            'c' => {}
            _ => out.push_str(&arg.to_string()),
        }
    }

    (out, &args[next..])
}

fn format_string(arg: &Value) -> String {
    match arg {
        Value::BigInt(digits) => format!("{}n", digits),
        Value::Symbol(_) | Value::Object { .. } | Value::Array { .. } => arg.to_string(),
        other => other.render_plain(),
    }
}

fn format_integral(arg: &Value, truncate: bool) -> String {
    match arg {
        Value::BigInt(digits) => format!("{}n", digits),
        Value::Symbol(_) => "NaN".to_string(),
        _ if truncate => format_number(parse_float(arg).trunc()),
        other => format_number(to_number(other)),
    }
}

/// `Number(value)` for primitives; objects become `NaN`.
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

/// `parseFloat(String(value))`: the longest numeric prefix.
fn parse_float(value: &Value) -> f64 {
    let text = match value {
        Value::Number(n) => return *n,
        Value::String(s) => s.trim_start().to_string(),
        other => other.render_plain(),
    };
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;
    let mut seen_exponent = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exponent && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'.' if !seen_point && !seen_exponent => seen_point = true,
            b'e' | b'E' if seen_digit && !seen_exponent => seen_exponent = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit && !seen_point && text[end..].starts_with("Infinity") {
        return if text.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    // Back off a dangling exponent or sign.
    let mut candidate = &text[..end];
    while !candidate.is_empty() {
        if let Ok(n) = candidate.parse::<f64>() {
            return n;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    f64::NAN
}

/// `JSON.stringify` of a snapshot.
fn to_json(value: &Value) -> String {
    match json_value(value) {
        Some(json) => json.to_string(),
        None => "undefined".to_string(),
    }
}

fn json_value(value: &Value) -> Option<serde_json::Value> {
    use serde_json::Value as Json;
    Some(match value {
        Value::Undefined | Value::Function { .. } | Value::Symbol(_) => return None,
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 => {
            Json::from(*n as i64)
        }
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::BigInt(_) => return None,
        Value::String(s) => Json::String(s.clone()),
        Value::Date(iso) => Json::String(iso.clone()),
        Value::Array { items, .. } => Json::Array(
            items
                .iter()
                .map(|item| json_value(item).unwrap_or(Json::Null))
                .collect(),
        ),
        Value::Object { entries, .. } => Json::Object(
            entries
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), json_value(value)?)))
                .collect(),
        ),
        Value::Map { .. } | Value::Set { .. } | Value::Error(_) | Value::RegExp(_) => {
            Json::Object(serde_json::Map::new())
        }
        Value::Circular => Json::String("[Circular]".to_string()),
        Value::Truncated(_) => Json::Object(serde_json::Map::new()),
    })
}
