//! Value coercion for `key=value` body fields.
//!
//! A raw value is tried against an ordered list of parsers and the first one
//! that accepts it decides the JSON type. Integers are tried before floats so
//! integral values never pass through `f64`.

use serde_json::{Number, Value};

/// A body value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedScalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

type Trial = fn(&str) -> Option<TypedScalar>;

/// Parsers in precedence order. `String` is the fallback and never fails.
const TRIALS: &[Trial] = &[parse_int, parse_float, parse_bool];

fn parse_int(raw: &str) -> Option<TypedScalar> {
    raw.parse::<i64>().ok().map(TypedScalar::Int)
}

fn parse_float(raw: &str) -> Option<TypedScalar> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(TypedScalar::Float)
}

fn parse_bool(raw: &str) -> Option<TypedScalar> {
    crate::config::parse_bool(raw).map(TypedScalar::Bool)
}

/// Coerce a raw text value into the first scalar type that accepts it.
pub fn coerce(raw: &str) -> TypedScalar {
    TRIALS
        .iter()
        .find_map(|trial| trial(raw))
        .unwrap_or_else(|| TypedScalar::String(raw.to_string()))
}

impl TypedScalar {
    pub fn to_json(&self) -> Value {
        match self {
            TypedScalar::Int(value) => Value::from(*value),
            TypedScalar::Float(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            TypedScalar::Bool(value) => Value::Bool(*value),
            TypedScalar::String(value) => Value::String(value.clone()),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypedScalar::String(_))
    }
}

/// Body text for the single-field form, where the whole request body is one
/// JSON scalar.
///
/// Numbers and booleans are sent raw, the empty string becomes `""`, and any
/// other string is wrapped in quotes unless it already starts or ends with one.
pub fn single_field_body(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }
    if !coerce(raw).is_string() || raw.starts_with('"') || raw.ends_with('"') {
        return raw.to_string();
    }
    format!("\"{}\"", raw)
}
