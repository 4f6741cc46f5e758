#![forbid(unsafe_code)]

//! Dynamic record values and the coercions predicates usually want.
//!
//! Records store [`serde_json::Value`]. Predicates commonly need loose
//! truthiness (`!!value`) and numeric coercion (`+value`); both are provided
//! here so every test declaration agrees on the same rules.

pub use serde_json::Value;

/// Loose truthiness.
///
/// `null`, `false`, `0`, `NaN` and the empty string are falsy. Arrays and
/// objects are always truthy, even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion.
///
/// Strings are trimmed first; an empty string is `0`. Anything that does not
/// parse, and any array or object, is `NaN`.
#[must_use]
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}
