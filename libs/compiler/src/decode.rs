use serde_json::Value;

use crate::error::{CompileError, DecodeError};
use crate::value::{ParameterValue, Shape};

/// Decode a raw parameter payload into positional values.
///
/// An empty (or all-whitespace) payload means "no parameters". Otherwise the
/// payload must be a JSON object; its values become the parameters in the
/// order their keys appear in the document. Keys are only labels.
pub fn decode(raw: &[u8]) -> Result<Vec<ParameterValue>, CompileError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_slice(raw).map_err(DecodeError::from)?;
    let shape = Shape::of_json(&document);
    let Value::Object(members) = document else {
        return Err(DecodeError::new(format!("expected a JSON object, got {shape}")).into());
    };

    members
        .into_iter()
        .enumerate()
        .map(|(i, (_, value))| {
            ParameterValue::from_json(value).map_err(|e| CompileError::param_type(i + 1, e))
        })
        .collect()
}
