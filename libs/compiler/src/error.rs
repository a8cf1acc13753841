use std::fmt;

/// Stable, caller-facing category of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    ParamType,
    InvalidIdentifier,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::ParamType => "param_type",
            ErrorKind::InvalidIdentifier => "invalid_identifier",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw payload is not a well-formed JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter payload: {detail}")]
pub struct DecodeError {
    pub detail: String,
}

impl DecodeError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// A single value does not have the shape a formatter accepts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {actual}")]
pub struct ParamTypeError {
    pub expected: &'static str,
    pub actual: String,
}

impl ParamTypeError {
    pub fn new(expected: &'static str, actual: impl Into<String>) -> Self {
        Self {
            expected,
            actual: actual.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// `position` is 1-based, in payload order.
    #[error("parameter {position}: {source}")]
    ParamType {
        position: usize,
        #[source]
        source: ParamTypeError,
    },

    #[error("invalid {role} identifier '{name}': {reason}")]
    InvalidIdentifier {
        role: &'static str,
        name: String,
        reason: &'static str,
    },
}

impl CompileError {
    pub fn param_type(position: usize, source: ParamTypeError) -> Self {
        Self::ParamType { position, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Decode(_) => ErrorKind::Decode,
            CompileError::ParamType { .. } => ErrorKind::ParamType,
            CompileError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
        }
    }
}
