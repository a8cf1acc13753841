use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use dbapi_api::ExecutorError;
use dbapi_compiler::CompileError;

/// Failure of a single HTTP call.
///
/// Serialized as `{"error": {"kind": ..., "message": ...}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("invalid query string: {}", .0.body_text())]
    QueryString(#[from] QueryRejection),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Compile(e) => e.kind().as_str(),
            ApiError::Executor(e) => e.kind().as_str(),
            ApiError::QueryString(_) => dbapi_compiler::ErrorKind::Decode.as_str(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Compile(_) | ApiError::QueryString(_) => StatusCode::BAD_REQUEST,
            ApiError::Executor(e) => match e.kind() {
                dbapi_api::ErrorKind::Query => StatusCode::UNPROCESSABLE_ENTITY,
                dbapi_api::ErrorKind::Connection => StatusCode::SERVICE_UNAVAILABLE,
                dbapi_api::ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}
