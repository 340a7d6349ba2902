//! Judging value model
//!
//! Test-case inputs, expected outputs and the outputs received from user code
//! all travel as [`Value`]s. Plain data maps onto JSON directly; the values
//! JSON cannot carry use small tagged objects:
//!
//! - non-finite numbers: `{"$number": "NaN" | "Infinity" | "-Infinity"}`
//! - runtime-only values: `{"$runtime": "function" | "class" | ...}`
//! - plain objects whose only key is one of the tags above:
//!   `{"$object": [key, value]}`
//!
//! Function placeholders (`{"__fn": "(a, b) => a - b"}`) stay ordinary
//! objects here. They only become callables during rehydration.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key marking an object as a function placeholder
pub const FUNCTION_LITERAL_KEY: &str = "__fn";

const NUMBER_KEY: &str = "$number";
const RUNTIME_KEY: &str = "$runtime";
const OBJECT_KEY: &str = "$object";

/// Largest integer that survives a round trip through `f64`
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A structured value exchanged with the judge
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A value produced by user code that has no data representation
    Opaque(Opaque),
}

/// Runtime-only values received from user code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opaque {
    Undefined,
    Function,
    Class,
    Promise,
    Symbol,
    BigInt,
    /// A reference back to an enclosing container
    Circular,
}

/// Runtime category of a value, as seen by type-tag comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeCategory {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Function,
    Class,
    Promise,
    Symbol,
    BigInt,
    Circular,
}

impl RuntimeCategory {
    /// Whether values of this category can be called
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, RuntimeCategory::Function | RuntimeCategory::Class)
    }
}

impl Opaque {
    /// Parse the `$runtime` tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "undefined" => Some(Opaque::Undefined),
            "function" => Some(Opaque::Function),
            "class" => Some(Opaque::Class),
            "promise" => Some(Opaque::Promise),
            "symbol" => Some(Opaque::Symbol),
            "bigint" => Some(Opaque::BigInt),
            "circular" => Some(Opaque::Circular),
            _ => None,
        }
    }

    /// The `$runtime` tag name
    pub fn tag(self) -> &'static str {
        match self {
            Opaque::Undefined => "undefined",
            Opaque::Function => "function",
            Opaque::Class => "class",
            Opaque::Promise => "promise",
            Opaque::Symbol => "symbol",
            Opaque::BigInt => "bigint",
            Opaque::Circular => "circular",
        }
    }

    pub fn category(self) -> RuntimeCategory {
        match self {
            Opaque::Undefined => RuntimeCategory::Undefined,
            Opaque::Function => RuntimeCategory::Function,
            Opaque::Class => RuntimeCategory::Class,
            Opaque::Promise => RuntimeCategory::Promise,
            Opaque::Symbol => RuntimeCategory::Symbol,
            Opaque::BigInt => RuntimeCategory::BigInt,
            Opaque::Circular => RuntimeCategory::Circular,
        }
    }
}

impl Value {
    /// The `undefined` value
    pub const UNDEFINED: Value = Value::Opaque(Opaque::Undefined);

    /// Build a function placeholder carrying JavaScript source text
    pub fn function_literal(source: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            FUNCTION_LITERAL_KEY.to_string(),
            Value::String(source.into()),
        );
        Value::Object(entries)
    }

    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Source text of a function placeholder, if this is one
    pub fn as_function_literal(&self) -> Option<&str> {
        match self {
            Value::Object(entries) => match entries.get(FUNCTION_LITERAL_KEY) {
                Some(Value::String(source)) if !source.is_empty() => Some(source),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn category(&self) -> RuntimeCategory {
        match self {
            Value::Null => RuntimeCategory::Null,
            Value::Bool(_) => RuntimeCategory::Boolean,
            Value::Number(_) => RuntimeCategory::Number,
            Value::String(_) => RuntimeCategory::String,
            Value::Array(_) => RuntimeCategory::Array,
            Value::Object(_) => RuntimeCategory::Object,
            Value::Opaque(kind) => kind.category(),
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Value::Opaque(value)
    }
}

/// Deserialize JSON with no limit on nesting depth
///
/// The stack grows on demand, so deeply nested judged values decode as
/// long as memory allows.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

fn is_reserved_key(key: &str) -> bool {
    matches!(key, NUMBER_KEY | RUNTIME_KEY | OBJECT_KEY)
}

/// The sole entry of an object that would read back as a tagged form
fn reserved_entry(entries: &BTreeMap<String, Value>) -> Option<(&String, &Value)> {
    match entries.iter().next() {
        Some(entry) if entries.len() == 1 && is_reserved_key(entry.0) => Some(entry),
        _ => None,
    }
}

fn non_finite_name(n: f64) -> &'static str {
    if n.is_nan() {
        "NaN"
    } else if n.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

fn parse_non_finite(name: &str) -> Option<f64> {
    match name {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if !n.is_finite() => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NUMBER_KEY, non_finite_name(*n))?;
                map.end()
            }
            // Integral values print without a trailing `.0`
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(entries) => match reserved_entry(entries) {
                Some(entry) => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    map.serialize_entry(OBJECT_KEY, &entry)?;
                    map.end()
                }
                None => serializer.collect_map(entries),
            },
            Value::Opaque(kind) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(RUNTIME_KEY, kind.tag())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.insert(key, value);
        }
        Ok(decode_tagged(entries))
    }
}

/// Recognise the single-key tagged forms; anything else is a plain object
fn decode_tagged(entries: BTreeMap<String, Value>) -> Value {
    if entries.len() == 1 {
        if let Some(Value::String(name)) = entries.get(NUMBER_KEY) {
            if let Some(n) = parse_non_finite(name) {
                return Value::Number(n);
            }
        }
        if let Some(Value::String(tag)) = entries.get(RUNTIME_KEY) {
            if let Some(kind) = Opaque::from_tag(tag) {
                return Value::Opaque(kind);
            }
        }
        if let Some(Value::Array(pair)) = entries.get(OBJECT_KEY) {
            if let [Value::String(key), value] = pair.as_slice() {
                if is_reserved_key(key) {
                    return Value::object([(key.clone(), value.clone())]);
                }
            }
        }
    }
    Value::Object(entries)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Renders values the way a JavaScript console would print them
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if !n.is_finite() => f.write_str(non_finite_name(*n)),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_quoted(f, s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_str("}")
            }
            Value::Opaque(Opaque::Undefined) => f.write_str("undefined"),
            Value::Opaque(Opaque::Function) => f.write_str("[Function]"),
            Value::Opaque(Opaque::Class) => f.write_str("[class]"),
            Value::Opaque(Opaque::Promise) => f.write_str("Promise { <pending> }"),
            Value::Opaque(Opaque::Symbol) => f.write_str("Symbol()"),
            Value::Opaque(Opaque::BigInt) => f.write_str("[BigInt]"),
            Value::Opaque(Opaque::Circular) => f.write_str("[Circular]"),
        }
    }
}
