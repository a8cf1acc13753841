//! HTTP surface: routine endpoints and the catalog index.

mod error;
mod http;
pub mod index;

use std::sync::Arc;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware;
use axum::response::Response;
use axum::routing::get;
use axum::{Router, ServiceExt};
use tokio_util::sync::CancellationToken;
use tower_http::normalize_path::NormalizePath;

use dbapi_api::RoutineExecutor;

pub use error::ApiError;
pub use http::InvocationResponse;

#[derive(Clone)]
struct AppState {
    executor: Arc<dyn RoutineExecutor>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    #[error("bind api {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("axum serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// Routes:
/// - `GET /`: catalog index
/// - `GET /{schema}/{routine}?args=<json object>`
/// - `POST /{schema}/{routine}` with the JSON object as body
///
/// Trailing slashes are stripped before routing.
pub fn router(executor: Arc<dyn RoutineExecutor>) -> NormalizePath<Router> {
    let state = AppState { executor };

    let routine = get(http::handle_routine_get)
        .post(http::handle_routine_post)
        .options(http::handle_preflight);

    let app = Router::new()
        .route("/", get(http::handle_index))
        .route("/{schema}/{routine}", routine)
        .layer(middleware::map_response(add_cors_headers))
        .with_state(state);

    NormalizePath::trim_trailing_slash(app)
}

/// Serve until `shutdown` is cancelled.
pub async fn run(
    host: &str,
    port: u16,
    executor: Arc<dyn RoutineExecutor>,
    shutdown: CancellationToken,
) -> Result<(), ApiServerError> {
    let app = router(executor);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiServerError::Bind { addr: addr.clone(), source })?;
    tracing::info!(%addr, "api server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ApiServerError::Serve)?;

    Ok(())
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Credentials, X-Requested-With, Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, PUT, POST, OPTIONS, DELETE"),
    );
    response
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use dbapi_api::{CatalogEntry, ExecutorError, RoutineKind, Row};

    use super::*;

    /// Records every statement and answers with a fixed result.
    struct FakeExecutor {
        executed: Mutex<Vec<String>>,
        result: Result<Vec<Row>, ExecutorError>,
        catalog: Vec<CatalogEntry>,
    }

    impl FakeExecutor {
        fn returning(rows: Value) -> Arc<Self> {
            let rows = match rows {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Arc::new(Self {
                executed: Mutex::new(Vec::new()),
                result: Ok(rows),
                catalog: Vec::new(),
            })
        }

        fn failing(err: ExecutorError) -> Arc<Self> {
            Arc::new(Self {
                executed: Mutex::new(Vec::new()),
                result: Err(err),
                catalog: Vec::new(),
            })
        }

        fn with_catalog(catalog: Vec<CatalogEntry>) -> Arc<Self> {
            Arc::new(Self {
                executed: Mutex::new(Vec::new()),
                result: Ok(Vec::new()),
                catalog,
            })
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    impl RoutineExecutor for FakeExecutor {
        fn execute<'a>(&'a self, sql: &'a str)
            -> Pin<Box<dyn Future<Output = Result<Vec<Row>, ExecutorError>> + Send + 'a>>
        {
            self.executed.lock().unwrap().push(sql.to_owned());
            let result = self.result.clone();
            Box::pin(async move { result })
        }

        fn catalog(&self) -> Pin<Box<dyn Future<Output = Result<Vec<CatalogEntry>, ExecutorError>> + Send + '_>> {
            let catalog = self.catalog.clone();
            Box::pin(async move { Ok(catalog) })
        }
    }

    async fn send(executor: Arc<FakeExecutor>, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = router(executor).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_with_args_compiles_and_executes() {
        let executor = FakeExecutor::returning(json!([{"id": 1, "name": "pav"}]));
        // args={"name":"pav","age":[1,2,3,4]}
        let uri = "/search/entities?args=%7B%22name%22%3A%22pav%22%2C%22age%22%3A%5B1%2C2%2C3%2C4%5D%7D";

        let (status, _, body) = send(executor.clone(), get(uri)).await;

        assert_eq!(status, StatusCode::OK);
        let sql = "SELECT * FROM search.entities('pav', '{1, 2, 3, 4}')";
        assert_eq!(body, json!({"query": sql, "results": [{"id": 1, "name": "pav"}]}));
        assert_eq!(executor.executed(), vec![sql.to_owned()]);
    }

    #[tokio::test]
    async fn post_body_is_the_payload() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(
            executor.clone(),
            post("/cms/migrate", r#"{"id": 1, "tags": ["a", "b", "c"], "force": true}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "SELECT * FROM cms.migrate(1, '{a, b, c}', TRUE)");
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn no_args_means_no_parentheses() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(executor.clone(), get("/cms/log_view")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "SELECT * FROM cms.log_view");
    }

    #[tokio::test]
    async fn trailing_slashes_are_ignored() {
        for uri in ["/cms/log_view/", "/cms/log_view//", "/cms/log_view///"] {
            let executor = FakeExecutor::returning(json!([]));
            let (status, _, body) = send(executor, get(uri)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["query"], "SELECT * FROM cms.log_view");
        }

        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(executor, post("/cms/migrate//", r#"{"id": 1}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "SELECT * FROM cms.migrate(1)");
    }

    #[tokio::test]
    async fn unreadable_query_string_gets_a_json_error() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, headers, body) = send(executor.clone(), get("/s/f?args=%7B%7D&args=%7B%7D")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body["error"]["kind"], "decode");
        assert!(body["error"]["message"].as_str().unwrap().starts_with("invalid query string"));
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_a_client_error() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(executor.clone(), post("/s/f", "{not valid json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "decode");
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn null_parameter_is_a_client_error() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(executor.clone(), post("/s/f", r#"{"a": null}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "param_type");
        assert_eq!(body["error"]["message"], "parameter 1: expected a non-null value, got null");
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn unsafe_identifier_never_reaches_the_database() {
        let executor = FakeExecutor::returning(json!([]));
        let (status, _, body) = send(executor.clone(), get("/cms/log_view%3B%20DROP%20TABLE%20x")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "invalid_identifier");
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn database_errors_map_to_status_codes() {
        let executor = FakeExecutor::failing(ExecutorError::query("function cms.nope() does not exist"));
        let (status, _, body) = send(executor, get("/cms/nope")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], "query");
        assert_eq!(body["error"]["message"], "function cms.nope() does not exist");

        let executor = FakeExecutor::failing(ExecutorError::connection("connection refused"));
        let (status, _, body) = send(executor, get("/cms/log_view")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["kind"], "connection");
    }

    #[tokio::test]
    async fn every_response_carries_cors_headers() {
        let executor = FakeExecutor::returning(json!([]));
        let (_, headers, _) = send(executor.clone(), get("/cms/log_view")).await;
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, PUT, POST, OPTIONS, DELETE");

        let (status, headers, _) = send(executor.clone(), post("/s/f", "[1]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/s/f")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(executor, preflight).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "Authorization, Credentials, X-Requested-With, Content-Type"
        );
    }

    #[tokio::test]
    async fn index_lists_catalog_by_namespace() {
        let entry = |schema: &str, name: &str, kind, args: &str| CatalogEntry {
            schema: schema.into(),
            name: name.into(),
            kind,
            args: args.into(),
        };
        let executor = FakeExecutor::with_catalog(vec![
            entry("search", "entities", RoutineKind::Function, "name text, age integer[]"),
            entry("cms", "log_view", RoutineKind::View, ""),
            entry("cms", "migrate", RoutineKind::Function, "id integer"),
        ]);

        let (status, _, body) = send(executor, get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "namespaces_count": 2,
                "schemas": ["cms", "search"],
                "namespaces": [
                    {
                        "name": "cms",
                        "functions": [{"name": "migrate", "uri": "/cms/migrate", "args": "id integer"}],
                        "views": [{"name": "log_view", "uri": "/cms/log_view", "args": ""}],
                    },
                    {
                        "name": "search",
                        "functions": [{"name": "entities", "uri": "/search/entities", "args": "name text, age integer[]"}],
                        "views": [],
                    },
                ],
            })
        );
    }
}
