#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("postgres: {0}")]
    Executor(#[from] dbapi_api::ExecutorError),

    #[error("{0}")]
    Api(#[from] dbapi_api_server::ApiServerError),

    #[error("api task: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
