//! Input rehydration
//!
//! Test inputs are plain data, so a test that wants to hand the user function
//! a comparator encodes it as `{"__fn": "(a, b) => a - b"}`. [`rehydrate`]
//! turns such placeholders into [`RuntimeValue::Callable`] nodes, and
//! [`RuntimeValue::to_js`] renders the result as a JavaScript expression that
//! the worker evaluates to obtain the live arguments.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::value::{Opaque, Value};

/// Expression the worker exposes for compiling placeholder source text
pub(crate) const REVIVE_HOOK: &str = "__kata.revive";

/// A test input ready to be materialised inside the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<RuntimeValue>),
    Object(BTreeMap<String, RuntimeValue>),
    /// Function source text, compiled when the arguments are built
    Callable(String),
    Opaque(Opaque),
}

/// Rehydrate a single value
pub fn rehydrate(value: &Value) -> RuntimeValue {
    match value {
        Value::Null => RuntimeValue::Null,
        Value::Bool(b) => RuntimeValue::Bool(*b),
        Value::Number(n) => RuntimeValue::Number(*n),
        Value::String(s) => RuntimeValue::String(s.clone()),
        Value::Array(items) => RuntimeValue::Array(items.iter().map(rehydrate).collect()),
        Value::Object(entries) => match value.as_function_literal() {
            Some(source) => RuntimeValue::Callable(source.to_string()),
            None => RuntimeValue::Object(
                entries
                    .iter()
                    .map(|(key, v)| (key.clone(), rehydrate(v)))
                    .collect(),
            ),
        },
        Value::Opaque(kind) => RuntimeValue::Opaque(*kind),
    }
}

/// Rehydrate a positional argument list
pub fn rehydrate_arguments(input: &[Value]) -> Vec<RuntimeValue> {
    input.iter().map(rehydrate).collect()
}

/// Render an argument list as a JavaScript array literal
pub fn arguments_to_js(arguments: &[RuntimeValue]) -> String {
    let mut out = String::from("[");
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        argument.write_js(&mut out);
    }
    out.push(']');
    out
}

impl RuntimeValue {
    /// Render this value as a JavaScript expression
    pub fn to_js(&self) -> String {
        let mut out = String::new();
        self.write_js(&mut out);
        out
    }

    fn write_js(&self, out: &mut String) {
        match self {
            RuntimeValue::Null => out.push_str("null"),
            RuntimeValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            RuntimeValue::Number(n) => write_number(out, *n),
            RuntimeValue::String(s) => out.push_str(&quote_js(s)),
            RuntimeValue::Array(items) => out.push_str(&arguments_to_js(items)),
            RuntimeValue::Object(entries) => {
                out.push_str("({");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    // A literal `__proto__` key would set the prototype instead
                    if key == "__proto__" {
                        let _ = write!(out, "[{}]: ", quote_js(key));
                    } else {
                        let _ = write!(out, "{}: ", quote_js(key));
                    }
                    value.write_js(out);
                }
                out.push_str("})");
            }
            RuntimeValue::Callable(source) => {
                let _ = write!(out, "{REVIVE_HOOK}({})", quote_js(source));
            }
            RuntimeValue::Opaque(kind) => out.push_str(match kind {
                Opaque::Undefined => "undefined",
                Opaque::Function => "(function () {})",
                Opaque::Class => "(class {})",
                Opaque::Promise => "Promise.resolve()",
                Opaque::Symbol => "Symbol()",
                Opaque::BigInt => "0n",
                Opaque::Circular => "({})",
            }),
        }
    }
}

fn write_number(out: &mut String, n: f64) {
    if n.is_nan() {
        out.push_str("NaN");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else if n == 0.0 && n.is_sign_negative() {
        out.push_str("-0");
    } else {
        let _ = write!(out, "{n}");
    }
}

/// Quote a string as a JavaScript string literal
pub fn quote_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
