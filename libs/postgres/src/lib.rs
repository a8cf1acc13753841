//! Postgres backend for the routine executor.

pub mod catalog;
pub mod conn;
pub mod convert;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};

use dbapi_api::{CatalogEntry, ExecutorError, RoutineExecutor, Row};

pub use conn::parse_conn_str;
use convert::ColumnInfo;

// ═══════════════════════════════════════════════════════════════
//  PgExecutor
// ═══════════════════════════════════════════════════════════════

/// Runs invocations against one Postgres database.
///
/// Holds a single client, connected on first use and replaced when the
/// server closes it. Requests share the client through an `Arc`;
/// tokio-postgres pipelines concurrent queries over the one connection.
pub struct PgExecutor {
    config: Config,
    client: Mutex<Option<Arc<Client>>>,
}

impl PgExecutor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    pub fn from_conn_str(conn: &str) -> Result<Self, ExecutorError> {
        Ok(Self::new(parse_conn_str(conn)?))
    }

    async fn client(&self) -> Result<Arc<Client>, ExecutorError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            if !client.is_closed() {
                return Ok(client.clone());
            }
            tracing::warn!("postgres connection closed, reconnecting");
        }

        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| ExecutorError::connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection error");
            }
        });
        tracing::debug!("postgres connection established");

        let client = Arc::new(client);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// `SELECT version()`, the startup connectivity check.
    pub async fn version(&self) -> Result<String, ExecutorError> {
        let client = self.client().await?;
        let row = client.query_one("SELECT version()", &[]).await.map_err(map_pg_error)?;
        row.try_get::<_, String>(0).map_err(map_pg_error)
    }

    async fn run(&self, sql: &str) -> Result<Vec<Row>, ExecutorError> {
        let client = self.client().await?;

        // Prepare only to learn column types; the text itself runs verbatim.
        let statement = client.prepare(sql).await.map_err(map_pg_error)?;
        let columns: Vec<ColumnInfo> = statement
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_owned(),
                ty: c.type_().clone(),
            })
            .collect();

        let messages = client.simple_query(sql).await.map_err(map_pg_error)?;
        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                rows.push(convert::row_to_json(&columns, (0..row.len()).map(|i| row.get(i))));
            }
        }
        Ok(rows)
    }

    async fn list_routines(&self) -> Result<Vec<CatalogEntry>, ExecutorError> {
        let client = self.client().await?;
        let messages = client.simple_query(catalog::CATALOG_SQL).await.map_err(map_pg_error)?;
        let entries = messages
            .iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => {
                    catalog::entry_from_columns([row.get(0), row.get(1), row.get(2), row.get(3)])
                }
                _ => None,
            })
            .collect();
        Ok(entries)
    }
}

impl RoutineExecutor for PgExecutor {
    fn execute<'a>(&'a self, sql: &'a str)
        -> Pin<Box<dyn Future<Output = Result<Vec<Row>, ExecutorError>> + Send + 'a>>
    {
        Box::pin(self.run(sql))
    }

    fn catalog(&self) -> Pin<Box<dyn Future<Output = Result<Vec<CatalogEntry>, ExecutorError>> + Send + '_>> {
        Box::pin(self.list_routines())
    }
}

/// Server-reported errors are query errors; anything else means the
/// connection is unusable.
fn map_pg_error(e: tokio_postgres::Error) -> ExecutorError {
    if let Some(db) = e.as_db_error() {
        let mut message = format!("{}: {}", db.severity(), db.message());
        if let Some(detail) = db.detail() {
            message.push_str(&format!(" ({detail})"));
        }
        return ExecutorError::query(message).with_context(db.code().code());
    }
    if e.is_closed() {
        return ExecutorError::connection(e.to_string());
    }
    ExecutorError::query(e.to_string())
}
