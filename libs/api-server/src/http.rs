use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use dbapi_api::Row;
use dbapi_compiler::InvocationRequest;

use super::error::ApiError;
use super::index::{build_index, Index};
use super::AppState;

/// Body of a successful routine call.
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    /// The statement that was executed.
    pub query: String,
    pub results: Vec<Row>,
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_index(State(state): State<AppState>) -> Result<Json<Index>, ApiError> {
    let entries = state.executor.catalog().await.inspect_err(|e| {
        tracing::error!(error = %e, "catalog query failed");
    })?;
    Ok(Json(build_index(entries)))
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET|POST /{schema}/{routine}
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct RoutineQueryParams {
    args: Option<String>,
}

pub(crate) async fn handle_routine_get(
    State(state): State<AppState>,
    Path((schema, routine)): Path<(String, String)>,
    params: Result<Query<RoutineQueryParams>, QueryRejection>,
) -> Result<Json<InvocationResponse>, ApiError> {
    let Query(params) = params.inspect_err(|e| {
        tracing::warn!(%schema, %routine, error = %e, "unreadable query string");
    })?;
    let raw = params.args.unwrap_or_default();
    dispatch(&state, &schema, &routine, raw.as_bytes()).await.map(Json)
}

pub(crate) async fn handle_routine_post(
    State(state): State<AppState>,
    Path((schema, routine)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<InvocationResponse>, ApiError> {
    dispatch(&state, &schema, &routine, &body).await.map(Json)
}

pub(crate) async fn handle_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// decode → compile → execute.
async fn dispatch(state: &AppState, schema: &str, routine: &str, raw: &[u8]) -> Result<InvocationResponse, ApiError> {
    let request = InvocationRequest::decode(schema, routine, raw).map_err(ApiError::from).inspect_err(|e| {
        tracing::warn!(schema, routine, kind = e.kind(), error = %e, "routine call rejected");
    })?;
    let params = request.parameters.len();

    let result = invoke(state, &request).await;
    match &result {
        Ok(response) => {
            tracing::info!(schema, routine, params, rows = response.results.len(), "routine executed");
        }
        Err(e) => {
            tracing::warn!(schema, routine, params, kind = e.kind(), error = %e, "routine call rejected");
        }
    }
    result
}

async fn invoke(state: &AppState, request: &InvocationRequest) -> Result<InvocationResponse, ApiError> {
    let sql = request.compile()?;
    tracing::debug!(%sql, "compiled invocation");

    let results = state.executor.execute(sql.as_str()).await?;
    Ok(InvocationResponse {
        query: sql.into_string(),
        results,
    })
}
