/// Category of an executor error. Lets the HTTP layer pick a status code
/// without looking at database internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid connection settings. Permanent; fail at startup.
    Config,
    /// Cannot reach the database or the connection was lost. Transient.
    Connection,
    /// The database rejected the statement.
    Query,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Connection => "connection",
            ErrorKind::Query => "query",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every [`crate::RoutineExecutor`] method.
///
/// Carries an `ErrorKind` for categorization and a human-readable message.
#[derive(Clone, PartialEq, Eq)]
pub struct ExecutorError {
    kind: ErrorKind,
    message: String,
}

impl ExecutorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Connection, message: msg.into() }
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Query, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl std::fmt::Debug for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExecutorError {}
