use std::fmt;

use crate::classify;
use crate::decode::decode;
use crate::error::CompileError;
use crate::ident::validate_identifier;
use crate::value::ParameterValue;

/// One routine call as it arrives from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub schema: String,
    pub routine: String,
    pub parameters: Vec<ParameterValue>,
}

/// Executable statement text produced by [`compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationExpression(String);

impl InvocationExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for InvocationExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InvocationExpression {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl InvocationRequest {
    pub fn new(schema: impl Into<String>, routine: impl Into<String>, parameters: Vec<ParameterValue>) -> Self {
        Self {
            schema: schema.into(),
            routine: routine.into(),
            parameters,
        }
    }

    /// Build a request from path segments and a raw JSON payload.
    pub fn decode(schema: &str, routine: &str, raw: &[u8]) -> Result<Self, CompileError> {
        Ok(Self::new(schema, routine, decode(raw)?))
    }

    pub fn compile(&self) -> Result<InvocationExpression, CompileError> {
        compile(&self.schema, &self.routine, &self.parameters)
    }
}

/// Render `SELECT * FROM schema.routine(lit, ...)`.
///
/// Without parameters the parentheses are omitted, so views and
/// zero-argument functions share one form. The first rejected value aborts
/// the whole compile.
pub fn compile(schema: &str, routine: &str, values: &[ParameterValue]) -> Result<InvocationExpression, CompileError> {
    validate_identifier("schema", schema)?;
    validate_identifier("routine", routine)?;

    let mut sql = format!("SELECT * FROM {schema}.{routine}");
    if values.is_empty() {
        return Ok(InvocationExpression(sql));
    }

    let literals = values
        .iter()
        .enumerate()
        .map(|(i, value)| classify::render(value).map_err(|e| CompileError::param_type(i + 1, e)))
        .collect::<Result<Vec<_>, _>>()?;

    sql.push('(');
    sql.push_str(&literals.join(", "));
    sql.push(')');
    Ok(InvocationExpression(sql))
}
