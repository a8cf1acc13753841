pub mod error;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

pub use error::{ErrorKind, ExecutorError};

// ════════════════════════════════════════════════════════════════
//  Catalog
// ════════════════════════════════════════════════════════════════

/// What kind of routine a catalog entry exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Function,
    View,
}

impl std::fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutineKind::Function => write!(f, "function"),
            RoutineKind::View => write!(f, "view"),
        }
    }
}

/// One routine the database exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub schema: String,
    pub name: String,
    pub kind: RoutineKind,
    /// Declared argument list as the database prints it
    /// (`name text, ids integer[]`); empty for views.
    pub args: String,
}

impl CatalogEntry {
    /// HTTP path serving this routine.
    pub fn uri(&self) -> String {
        format!("/{}/{}", self.schema, self.name)
    }
}

// ════════════════════════════════════════════════════════════════
//  Result rows
// ════════════════════════════════════════════════════════════════

/// One result row: column name → value, in column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

// ════════════════════════════════════════════════════════════════
//  Executor
// ════════════════════════════════════════════════════════════════

/// Data-store side of the service.
///
/// Handed to the HTTP layer explicitly; implementations own their
/// connection handling. The Postgres implementation lives in
/// `dbapi-postgres`, tests use in-memory fakes.
pub trait RoutineExecutor: Send + Sync {
    /// Run a compiled invocation verbatim and return every row.
    fn execute<'a>(&'a self, sql: &'a str)
        -> Pin<Box<dyn Future<Output = Result<Vec<Row>, ExecutorError>> + Send + 'a>>;

    /// List the functions and views available for invocation.
    fn catalog(&self) -> Pin<Box<dyn Future<Output = Result<Vec<CatalogEntry>, ExecutorError>> + Send + '_>>;
}
