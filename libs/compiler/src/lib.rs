//! Parameter compiler.
//!
//! Turns a JSON parameter payload plus a `schema`/`routine` pair into a
//! single `SELECT * FROM schema.routine(...)` statement whose arguments are
//! rendered as SQL literals. Pure and synchronous: no I/O, no shared state.

pub mod classify;
pub mod compile;
pub mod decode;
pub mod error;
pub mod format;
pub mod ident;
pub mod value;

pub use classify::{classify, FormattingRule};
pub use compile::{compile, InvocationExpression, InvocationRequest};
pub use decode::decode;
pub use error::{CompileError, DecodeError, ErrorKind, ParamTypeError};
pub use value::{ParameterValue, Shape};
