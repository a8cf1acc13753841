use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::error::ParamTypeError;

/// Decoded routine argument.
///
/// One variant per JSON kind the compiler can render. JSON `null` has no
/// variant: it is rejected while converting, so every leaf of a nested
/// value is always one of the scalar kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Array(Vec<ParameterValue>),
    /// Members in document order.
    Structured(Vec<(String, ParameterValue)>),
}

/// Runtime kind of a value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Integer,
    Float,
    Boolean,
    Text,
    Array,
    Object,
    Null,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Integer => "integer",
            Shape::Float => "float",
            Shape::Boolean => "boolean",
            Shape::Text => "text",
            Shape::Array => "array",
            Shape::Object => "object",
            Shape::Null => "null",
        }
    }

    pub fn of_json(value: &Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Boolean,
            Value::Number(n) if n.is_f64() => Shape::Float,
            Value::Number(_) => Shape::Integer,
            Value::String(_) => Shape::Text,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParameterValue {
    pub fn shape(&self) -> Shape {
        match self {
            ParameterValue::Integer(_) => Shape::Integer,
            ParameterValue::Float(_) => Shape::Float,
            ParameterValue::Boolean(_) => Shape::Boolean,
            ParameterValue::Text(_) => Shape::Text,
            ParameterValue::Array(_) => Shape::Array,
            ParameterValue::Structured(_) => Shape::Object,
        }
    }

    /// Integer literals stay integers: one that does not fit `i64` is an
    /// error rather than a float. Relies on `arbitrary_precision` so the
    /// literal text survives parsing.
    fn from_number(n: &Number) -> Result<Self, ParamTypeError> {
        if let Some(i) = n.as_i64() {
            return Ok(ParameterValue::Integer(i));
        }
        let text = n.to_string();
        if !text.contains(['.', 'e', 'E']) {
            return Err(ParamTypeError::new(
                "a 64-bit signed integer",
                format!("out-of-range integer {text}"),
            ));
        }
        n.as_f64()
            .filter(|f| f.is_finite())
            .map(ParameterValue::Float)
            .ok_or_else(|| ParamTypeError::new("a number", format!("unrepresentable number {text}")))
    }

    /// Convert a decoded JSON value, recursively.
    ///
    /// Fails on `null` at any depth and on integers that do not fit `i64`.
    pub fn from_json(value: Value) -> Result<Self, ParamTypeError> {
        match value {
            Value::Null => Err(ParamTypeError::new("a non-null value", Shape::Null.as_str())),
            Value::Bool(b) => Ok(ParameterValue::Boolean(b)),
            Value::Number(n) => ParameterValue::from_number(&n),
            Value::String(s) => Ok(ParameterValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(ParameterValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(ParameterValue::Array),
            Value::Object(members) => members
                .into_iter()
                .map(|(k, v)| ParameterValue::from_json(v).map(|v| (k, v)))
                .collect::<Result<Vec<_>, _>>()
                .map(ParameterValue::Structured),
        }
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterValue::Integer(i) => serializer.serialize_i64(*i),
            ParameterValue::Float(f) => serializer.serialize_f64(*f),
            ParameterValue::Boolean(b) => serializer.serialize_bool(*b),
            ParameterValue::Text(s) => serializer.serialize_str(s),
            ParameterValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParameterValue::Structured(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (k, v) in members {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Integer(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Boolean(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Text(v.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::Text(v)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(v: Vec<T>) -> Self {
        ParameterValue::Array(v.into_iter().map(Into::into).collect())
    }
}
