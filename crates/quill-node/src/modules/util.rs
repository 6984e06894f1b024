// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `util` module implementation

use crate::error::{NodeError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use quill_macros::exports;

/// Create the util module exports
pub fn create_module() -> Namespace {
    exports! {
        "format" => Value::function("format", |args| {
            let formatted = match args.split_first() {
                Some((Value::String(fmt), rest)) => format(fmt, rest),
                // Without a format string every argument is appended
                _ => {
                    let joined = format("", args);
                    joined.strip_prefix(' ').unwrap_or(&joined).to_string()
                }
            };
            Ok(formatted.into())
        }),
        "inspect" => Value::function("inspect", |args| {
            let options = args.get(1).map(InspectOptions::from_value).transpose()?;
            Ok(inspect(args.first().unwrap_or(&Value::Undefined), options).into())
        }),
        "isDeepStrictEqual" => Value::function("isDeepStrictEqual", |args| {
            let a = args.first().unwrap_or(&Value::Undefined);
            let b = args.get(1).unwrap_or(&Value::Undefined);
            Ok(is_deep_strict_equal(a, b).into())
        }),
        "types" => create_types_module(),
    }
}

/// Create util.types submodule
fn create_types_module() -> Namespace {
    exports! {
        "isUint8Array" => Value::function("isUint8Array", |args| {
            Ok(matches!(args.first(), Some(Value::Bytes(_))).into())
        }),
        "isNativeError" => Value::function("isNativeError", |_| Ok(false.into())),
        "isPromise" => Value::function("isPromise", |_| Ok(false.into())),
    }
}

/// util.format(format, ...args) - Printf-like formatting
pub fn format(fmt: &str, args: &[Value]) -> String {
    let mut result = String::new();
    let mut arg_index = 0;
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            result.push('%');
            continue;
        };
        if next == '%' {
            chars.next();
            result.push('%');
            continue;
        }
        let render: fn(&Value) -> String = match next {
            's' => value_to_string,
            'd' | 'i' => value_to_integer_string,
            'f' => value_to_float_string,
            'j' => value_to_json,
            'o' | 'O' => |v| inspect(v, None),
            _ => {
                result.push('%');
                continue;
            }
        };
        chars.next();
        match args.get(arg_index) {
            Some(arg) => {
                result.push_str(&render(arg));
                arg_index += 1;
            }
            None => {
                result.push('%');
                result.push(next);
            }
        }
    }

    // Append remaining arguments
    for arg in args.iter().skip(arg_index) {
        result.push(' ');
        match arg {
            Value::String(s) => result.push_str(s),
            other => result.push_str(&inspect(other, None)),
        }
    }

    result
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Bytes(_) => inspect(value, None),
        other => other.to_string(),
    }
}

fn value_to_integer_string(value: &Value) -> String {
    number_to_string(to_number(value).trunc())
}

fn value_to_float_string(value: &Value) -> String {
    number_to_string(to_number(value))
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n.is_sign_positive() { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}

/// Largest integer an f64 holds exactly (`Number.MAX_SAFE_INTEGER`)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Boolean(b) => if *b { 1.0 } else { 0.0 },
        Value::Null => 0.0,
        _ => f64::NAN,
    }
}

fn value_to_json(value: &Value) -> String {
    let mut seen = Vec::new();
    match to_json(value, &mut seen) {
        Ok(Some(json)) => json.to_string(),
        Ok(None) => "undefined".to_string(),
        Err(()) => "[Circular]".to_string(),
    }
}

/// JSON.stringify semantics: `None` for values JSON omits, `Err` on cycles
fn to_json(value: &Value, seen: &mut Vec<usize>) -> std::result::Result<Option<serde_json::Value>, ()> {
    let json = match value {
        Value::Undefined | Value::Function(_) => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => serde_json::json!({ "type": "Buffer", "data": bytes.to_vec() }),
        Value::Object(ns) => {
            if seen.contains(&ns.id()) {
                return Err(());
            }
            seen.push(ns.id());
            let mut map = serde_json::Map::new();
            for (key, val) in ns.entries() {
                if let Some(json) = to_json(&val, seen)? {
                    map.insert(key, json);
                }
            }
            seen.pop();
            serde_json::Value::Object(map)
        }
    };
    Ok(Some(json))
}

/// util.inspect options
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Depth to recurse (`None` for unlimited)
    pub depth: Option<u32>,
    /// Max string length
    pub max_string_length: Option<usize>,
    /// Sort object keys
    pub sorted: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            depth: Some(2),
            max_string_length: Some(10000),
            sorted: false,
        }
    }
}

impl InspectOptions {
    /// Read options from a JavaScript options object
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut options = Self::default();
        let Value::Object(ns) = value else {
            return Err(NodeError::type_error(format!(
                "The \"options\" argument must be of type object. Received {}",
                value.type_of()
            )));
        };
        match ns.get("depth") {
            Some(Value::Number(n)) if n.is_infinite() => options.depth = None,
            Some(Value::Number(n)) if n >= 0.0 => options.depth = Some(n as u32),
            Some(Value::Null) => options.depth = None,
            _ => {}
        }
        match ns.get("maxStringLength") {
            Some(Value::Number(n)) if n.is_infinite() => options.max_string_length = None,
            Some(Value::Number(n)) if n >= 0.0 => options.max_string_length = Some(n as usize),
            Some(Value::Null) => options.max_string_length = None,
            _ => {}
        }
        if let Some(Value::Boolean(sorted)) = ns.get("sorted") {
            options.sorted = sorted;
        }
        Ok(options)
    }
}

/// util.inspect - format a value for debugging
pub fn inspect(value: &Value, options: Option<InspectOptions>) -> String {
    let options = options.unwrap_or_default();
    let mut seen = Vec::new();
    inspect_value(value, &options, 0, &mut seen)
}

fn inspect_value(value: &Value, options: &InspectOptions, depth: u32, seen: &mut Vec<usize>) -> String {
    match value {
        Value::Number(n) if n.is_nan() => "NaN".to_string(),
        Value::Number(n) if n.is_infinite() => {
            if n.is_sign_positive() { "Infinity" } else { "-Infinity" }.to_string()
        }
        Value::String(s) => match options.max_string_length {
            Some(max) if s.chars().count() > max => {
                let head: String = s.chars().take(max).collect();
                format!("'{}'... {} more characters", head, s.chars().count() - max)
            }
            _ => format!("'{}'", s),
        },
        Value::Bytes(bytes) => {
            let body: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
            if body.is_empty() {
                "<Buffer >".to_string()
            } else {
                format!("<Buffer {}>", body.join(" "))
            }
        }
        Value::Object(ns) => {
            if seen.contains(&ns.id()) {
                return "[Circular *1]".to_string();
            }
            if ns.is_empty() {
                return "{}".to_string();
            }
            if options.depth.is_some_and(|max| depth > max) {
                return "[Object]".to_string();
            }
            seen.push(ns.id());
            let mut entries = ns.entries();
            if options.sorted {
                entries.sort_by(|a, b| a.0.cmp(&b.0));
            }
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", k, inspect_value(v, options, depth + 1, seen)))
                .collect();
            seen.pop();
            format!("{{ {} }}", items.join(", "))
        }
        other => other.to_string(),
    }
}

/// util.isDeepStrictEqual(val1, val2)
pub fn is_deep_strict_equal(val1: &Value, val2: &Value) -> bool {
    deep_equal(val1, val2, &mut Vec::new())
}

fn deep_equal(a: &Value, b: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        // Object.is semantics: NaN equals NaN
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => {
            if Namespace::ptr_eq(x, y) || seen.contains(&(x.id(), y.id())) {
                return true;
            }
            let (ex, ey) = (x.entries(), y.entries());
            if ex.len() != ey.len() {
                return false;
            }
            seen.push((x.id(), y.id()));
            let equal = ex.iter().all(|(key, vx)| {
                y.get(key).is_some_and(|vy| deep_equal(vx, &vy, seen))
            });
            seen.pop();
            equal
        }
        _ => a.strict_equals(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_string() {
        let result = format("Hello, %s!", &[Value::String("World".to_string())]);
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_format_number() {
        let result = format("Count: %d", &[Value::Number(42.9)]);
        assert_eq!(result, "Count: 42");
        assert_eq!(format("%i", &[Value::from("nope")]), "NaN");
        assert_eq!(format("%d", &[Value::Number(1e20 + 0.5)]), "100000000000000000000");
        assert_eq!(format("%d", &[Value::Number(f64::NEG_INFINITY)]), "-Infinity");
    }

    #[test]
    fn test_format_json_numbers() {
        let obj = Namespace::from_entries([
            ("int", Value::Number(1.0)),
            ("neg", Value::Number(-42.0)),
            ("frac", Value::Number(2.5)),
            ("nan", Value::Number(f64::NAN)),
        ]);
        assert_eq!(
            format("%j", &[Value::Object(obj)]),
            r#"{"int":1,"neg":-42,"frac":2.5,"nan":null}"#
        );
        assert_eq!(format("%j", &[Value::Number(7.0)]), "7");
    }

    #[test]
    fn test_format_multiple() {
        let result = format(
            "%s is %d years old",
            &[Value::String("Alice".to_string()), Value::Number(30.0)],
        );
        assert_eq!(result, "Alice is 30 years old");
    }

    #[test]
    fn test_format_extra_and_missing_args() {
        let result = format(
            "Hello",
            &[Value::String("World".to_string()), Value::Number(42.0)],
        );
        assert_eq!(result, "Hello World 42");
        assert_eq!(format("%s and %s", &[Value::from("one")]), "one and %s");
        assert_eq!(format("100%%", &[]), "100%");
    }

    #[test]
    fn test_format_json() {
        let obj = Namespace::from_entries([
            ("a", Value::Number(1.0)),
            ("f", Value::function("f", |_| Ok(Value::Undefined))),
        ]);
        assert_eq!(format("%j", &[Value::Object(obj.clone())]), r#"{"a":1}"#);

        obj.set("me", Value::Object(obj.clone()));
        assert_eq!(format("%j", &[Value::Object(obj.clone())]), "[Circular]");
        obj.delete("me");
    }

    #[test]
    fn test_inspect_string() {
        let result = inspect(&Value::String("hello".to_string()), None);
        assert_eq!(result, "'hello'");
    }

    #[test]
    fn test_inspect_nested_object() {
        let inner = Namespace::from_entries([("b", Value::Number(2.0))]);
        let outer = Namespace::from_entries([
            ("a", Value::Number(1.0)),
            ("inner", Value::Object(inner)),
        ]);
        assert_eq!(
            inspect(&Value::Object(outer.clone()), None),
            "{ a: 1, inner: { b: 2 } }"
        );

        let shallow = InspectOptions {
            depth: Some(0),
            ..InspectOptions::default()
        };
        assert_eq!(
            inspect(&Value::Object(outer), Some(shallow)),
            "{ a: 1, inner: [Object] }"
        );
    }

    #[test]
    fn test_is_deep_strict_equal() {
        assert!(is_deep_strict_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(!is_deep_strict_equal(&Value::Number(1.0), &Value::Number(2.0)));
        assert!(is_deep_strict_equal(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));

        let a = Namespace::from_entries([("x", Value::Number(1.0)), ("y", Value::from("z"))]);
        let b = Namespace::from_entries([("y", Value::from("z")), ("x", Value::Number(1.0))]);
        assert!(is_deep_strict_equal(&Value::Object(a.clone()), &Value::Object(b.clone())));

        b.set("extra", Value::Null);
        assert!(!is_deep_strict_equal(&Value::Object(a), &Value::Object(b)));
    }

    #[test]
    fn test_types() {
        let ns = create_module();
        let types = ns.get("types").unwrap();
        let is_u8 = types.as_object().unwrap().get("isUint8Array").unwrap();
        let bytes = Value::Bytes(std::sync::Arc::from(&[1u8][..]));
        assert_eq!(is_u8.as_function().unwrap().call(&[bytes]).unwrap(), Value::Boolean(true));
    }
}
