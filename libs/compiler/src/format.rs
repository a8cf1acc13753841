//! Literal formatters.
//!
//! Each function renders one value into SQL text that is safe to place
//! between the parentheses of an invocation. None of them inspect the
//! variant beyond what their own rule accepts; picking the right one is
//! [`crate::classify`]'s job.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::ParamTypeError;
use crate::value::ParameterValue;

/// `42`, `-7`.
pub fn render_integer(v: i64) -> String {
    v.to_string()
}

/// Shortest round-trip form that always reads back as a float:
/// `2.0`, `0.1`, `1e300`.
pub fn render_float(v: f64) -> Result<String, ParamTypeError> {
    if !v.is_finite() {
        return Err(ParamTypeError::new("a finite number", format!("{v}")));
    }
    Ok(format!("{v:?}"))
}

pub fn render_boolean(v: bool) -> &'static str {
    if v { "TRUE" } else { "FALSE" }
}

/// Single-quoted string constant; embedded quotes are doubled.
pub fn quote_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Numeric,
    Boolean,
    Text,
}

impl ElementKind {
    fn as_str(self) -> &'static str {
        match self {
            ElementKind::Numeric => "numeric",
            ElementKind::Boolean => "boolean",
            ElementKind::Text => "text",
        }
    }
}

/// `'{1, 2, 3}'`, `'{a, b, c}'`.
///
/// Elements must all be numeric, all boolean or all text. Nested arrays and
/// objects are rejected. Text elements stay bare unless their content would
/// change the array structure, in which case they are double-quoted.
pub fn render_array(items: &[ParameterValue]) -> Result<String, ParamTypeError> {
    let mut kind: Option<ElementKind> = None;
    let mut elements = Vec::with_capacity(items.len());

    for item in items {
        let (item_kind, element) = match item {
            ParameterValue::Integer(i) => (ElementKind::Numeric, render_integer(*i)),
            ParameterValue::Float(f) => (ElementKind::Numeric, render_float(*f)?),
            ParameterValue::Boolean(b) => (ElementKind::Boolean, b.to_string()),
            ParameterValue::Text(s) => (ElementKind::Text, array_element_text(s)),
            ParameterValue::Array(_) => {
                return Err(ParamTypeError::new("an array of scalars", "nested array"));
            }
            ParameterValue::Structured(_) => {
                return Err(ParamTypeError::new("an array of scalars", "array containing an object"));
            }
        };
        match kind {
            None => kind = Some(item_kind),
            Some(k) if k != item_kind => {
                return Err(ParamTypeError::new(
                    "an array of a single element type",
                    format!("array mixing {} and {}", k.as_str(), item_kind.as_str()),
                ));
            }
            Some(_) => {}
        }
        elements.push(element);
    }

    Ok(quote_text(&format!("{{{}}}", elements.join(", "))))
}

fn array_element_text(s: &str) -> String {
    let needs_quotes = s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ',' | '"' | '\\'));
    if !needs_quotes {
        return s.to_owned();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `'{"k": "v"}'`, members in document order.
pub fn render_structured(value: &ParameterValue) -> Result<String, ParamTypeError> {
    ensure_finite(value)?;
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ParamTypeError::new("a JSON-serializable object", e.to_string()))?;
    let json = String::from_utf8(buf)
        .map_err(|e| ParamTypeError::new("a JSON-serializable object", e.to_string()))?;
    Ok(quote_text(&json))
}

fn ensure_finite(value: &ParameterValue) -> Result<(), ParamTypeError> {
    match value {
        ParameterValue::Float(f) => render_float(*f).map(|_| ()),
        ParameterValue::Array(items) => items.iter().try_for_each(ensure_finite),
        ParameterValue::Structured(members) => members.iter().try_for_each(|(_, v)| ensure_finite(v)),
        ParameterValue::Integer(_) | ParameterValue::Boolean(_) | ParameterValue::Text(_) => Ok(()),
    }
}

/// Compact JSON with a space after `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
