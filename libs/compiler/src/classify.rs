use crate::error::ParamTypeError;
use crate::format;
use crate::value::ParameterValue;

/// Formatting rule for one kind of value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingRule {
    Numeric,
    Boolean,
    Text,
    Array,
    Structured,
}

/// Pick the rule for a value. Total over [`ParameterValue`]: a new variant
/// does not compile until it is given a rule here.
pub fn classify(value: &ParameterValue) -> FormattingRule {
    match value {
        ParameterValue::Integer(_) | ParameterValue::Float(_) => FormattingRule::Numeric,
        ParameterValue::Boolean(_) => FormattingRule::Boolean,
        ParameterValue::Text(_) => FormattingRule::Text,
        ParameterValue::Array(_) => FormattingRule::Array,
        ParameterValue::Structured(_) => FormattingRule::Structured,
    }
}

impl FormattingRule {
    /// Shape name used in diagnostics.
    pub fn expected(self) -> &'static str {
        match self {
            FormattingRule::Numeric => "number",
            FormattingRule::Boolean => "boolean",
            FormattingRule::Text => "text",
            FormattingRule::Array => "array",
            FormattingRule::Structured => "object",
        }
    }

    pub fn accepts(self, value: &ParameterValue) -> bool {
        matches!(
            (self, value),
            (FormattingRule::Numeric, ParameterValue::Integer(_) | ParameterValue::Float(_))
                | (FormattingRule::Boolean, ParameterValue::Boolean(_))
                | (FormattingRule::Text, ParameterValue::Text(_))
                | (FormattingRule::Array, ParameterValue::Array(_))
                | (FormattingRule::Structured, ParameterValue::Structured(_))
        )
    }

    /// Check the value against this rule, then render it as a literal.
    pub fn validate_and_render(self, value: &ParameterValue) -> Result<String, ParamTypeError> {
        if !self.accepts(value) {
            return Err(ParamTypeError::new(self.expected(), value.shape().as_str()));
        }
        match value {
            ParameterValue::Integer(i) => Ok(format::render_integer(*i)),
            ParameterValue::Float(f) => format::render_float(*f),
            ParameterValue::Boolean(b) => Ok(format::render_boolean(*b).to_owned()),
            ParameterValue::Text(s) => Ok(format::quote_text(s)),
            ParameterValue::Array(items) => format::render_array(items),
            ParameterValue::Structured(_) => format::render_structured(value),
        }
    }
}

/// Classify and render in one step.
pub fn render(value: &ParameterValue) -> Result<String, ParamTypeError> {
    classify(value).validate_and_render(value)
}
