//! Judging equality
//!
//! [`deep_equal`] decides whether a received output matches the expected
//! output of a test case. Rules are checked in order and the first match wins:
//!
//! 1. An expected type tag (`"function"`, `"class"`, `"promise"`, `"array"`,
//!    `"number"`, `"undefined"`) matches any received value of that category.
//! 2. Identical primitives are equal.
//! 3. `NaN` equals `NaN`.
//! 4. Arrays are equal when their lengths match and items are pairwise equal.
//! 5. Objects are equal when their key sets match and every value is equal.
//!
//! Type tags are only honoured on the expected side.

use crate::value::{Opaque, RuntimeCategory, Value};

/// A reserved expected-side string asserting the category of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Function,
    Class,
    Promise,
    Array,
    Number,
    Undefined,
}

impl TypeTag {
    /// Parse a type tag from an expected string value
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "function" => Some(TypeTag::Function),
            "class" => Some(TypeTag::Class),
            "promise" => Some(TypeTag::Promise),
            "array" => Some(TypeTag::Array),
            "number" => Some(TypeTag::Number),
            "undefined" => Some(TypeTag::Undefined),
            _ => None,
        }
    }

    /// Whether a value of the given category satisfies this tag
    pub fn matches(self, category: RuntimeCategory) -> bool {
        match self {
            TypeTag::Function => category.is_callable(),
            TypeTag::Class => category == RuntimeCategory::Class,
            TypeTag::Promise => category == RuntimeCategory::Promise,
            TypeTag::Array => category == RuntimeCategory::Array,
            TypeTag::Number => category == RuntimeCategory::Number,
            TypeTag::Undefined => category == RuntimeCategory::Undefined,
        }
    }
}

/// Compare a received value against an expected value
pub fn deep_equal(actual: &Value, expected: &Value) -> bool {
    if let Value::String(tag) = expected {
        if let Some(tag) = TypeTag::parse(tag) {
            return tag.matches(actual.category());
        }
    }

    if identical(actual, expected) {
        return true;
    }

    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.is_nan() && b.is_nan(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => false,
    }
}

/// Strict identity over values that can be identical across the worker boundary
fn identical(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Opaque(Opaque::Undefined), Value::Opaque(Opaque::Undefined)) => true,
        _ => false,
    }
}
