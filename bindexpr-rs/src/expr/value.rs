//! Runtime value type for bound expressions.
//!
//! Values are loosely typed: operators coerce freely between numbers, text
//! and booleans, the way infix expressions embedded in markup usually do.
//! [`Value::Undefined`] doubles as the "no value available" marker that the
//! evaluator propagates instead of failing.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type NativeFn = dyn Fn(&Value, &[Value]) -> Value + Send + Sync;

/// A function supplied by the caller through the evaluation context.
///
/// The first argument is the receiver of a method-style call (`o.m()` binds
/// `o`), or [`Value::Undefined`] for a plain call.
#[derive(Clone)]
pub struct Callable(Arc<NativeFn>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        Callable(Arc::new(f))
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Value {
        (self.0)(this, args)
    }

    /// Identity comparison: two handles to the same function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// A runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Arc<Vec<Value>>),
    Object(Arc<HashMap<String, Value>>),
    Function(Callable),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Holes and nulls join as empty text.
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(_) => f.write_str("function () { [native code] }"),
        }
    }
}

/// Structural equality, used by tests and by callers comparing results.
///
/// This is not the expression language's `==`/`===`; see
/// [`Value::loose_eq`] and [`Value::strict_eq`] for those.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Wrap a closure as a function value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(Callable::new(f))
    }

    /// Build an object value from key/value pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Coerce to boolean: `undefined`, `null`, `false`, `0`, `NaN` and `""`
    /// are falsy; everything else, including empty arrays, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Name of the type, as `typeof` would report it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Coerce to a number. Unparseable text becomes `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined | Value::Function(_) => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => parse_number(s),
            Value::Array(_) | Value::Object(_) => parse_number(&self.to_string()),
        }
    }

    /// Reduce composites to their text form; primitives are returned as is.
    pub fn to_primitive(&self) -> Value {
        match self {
            Value::Array(_) | Value::Object(_) | Value::Function(_) => Value::Str(self.to_string()),
            other => other.clone(),
        }
    }

    /// Property lookup: object keys, array indices and `length`, text
    /// indices and `length`. Anything else yields `Undefined`.
    pub fn get_member(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
            Value::Array(items) if key == "length" => Value::Number(items.len() as f64),
            Value::Array(items) => index_key(key)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default(),
            Value::Str(s) if key == "length" => Value::Number(s.encode_utf16().count() as f64),
            Value::Str(s) => index_key(key)
                .and_then(|i| s.encode_utf16().nth(i))
                .map(|unit| Value::Str(String::from_utf16_lossy(&[unit])))
                .unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// `+`: concatenates when either primitive operand is text, otherwise
    /// adds numerically.
    pub fn concat_or_add(&self, rhs: &Value) -> Value {
        let (l, r) = (self.to_primitive(), rhs.to_primitive());
        match (&l, &r) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{l}{r}")),
            _ => Value::Number(l.to_number() + r.to_number()),
        }
    }

    /// Relational ordering. Two text operands compare by UTF-16 code units;
    /// anything else compares numerically, and `NaN` is unordered.
    pub fn compare(&self, rhs: &Value) -> Option<Ordering> {
        let (l, r) = (self.to_primitive(), rhs.to_primitive());
        match (&l, &r) {
            (Value::Str(a), Value::Str(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
            _ => l.to_number().partial_cmp(&r.to_number()),
        }
    }

    /// `===`: same type and same value; composites compare by identity.
    pub fn strict_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => self == rhs,
        }
    }

    /// `==`: equality after the usual loose coercions.
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        use Value::*;
        match (self, rhs) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (Number(a), Str(_)) => *a == rhs.to_number(),
            (Str(_), Number(b)) => self.to_number() == *b,
            (Bool(_), _) => Number(self.to_number()).loose_eq(rhs),
            (_, Bool(_)) => self.loose_eq(&Number(rhs.to_number())),
            (Array(_) | Object(_) | Function(_), Number(_) | Str(_)) => {
                self.to_primitive().loose_eq(rhs)
            }
            (Number(_) | Str(_), Array(_) | Object(_) | Function(_)) => {
                self.loose_eq(&rhs.to_primitive())
            }
            _ => self.strict_eq(rhs),
        }
    }
}

/// Render a number the way the expression language prints it: shortest
/// round-trip digits, no trailing `.0`, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        // Also covers -0.
        return "0".to_owned();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{n}");
    }
    let s = format!("{n:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

fn parse_number(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    // Rust accepts "inf" and "nan"; the expression language does not.
    if t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        t.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Canonical array index: `"2"` yes, `"02"` or `"2.0"` no.
fn index_key(key: &str) -> Option<usize> {
    let i: usize = key.parse().ok()?;
    (i.to_string() == key).then_some(i)
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(Arc::new(map))
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(Arc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => Value::Object(Arc::new(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
