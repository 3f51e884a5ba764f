//! PostgreSQL connection implementation

use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use zqlz_core::{Connection, ConnectionTarget, QueryResult, Result, Row, TlsMode, ZqlzError};

use crate::options::ConnectionOptions;
use crate::tls::{PostgresTlsConnector, tls_mode_to_sslmode};

/// Render a tokio-postgres error with the server's own wording first.
///
/// The server message is kept verbatim because error classifiers match on
/// it (e.g. "duplicate key value violates unique constraint").
pub(crate) fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail()
        && !detail.trim().is_empty()
    {
        message.push_str(&format!(" (detail: {})", detail));
    }

    if let Some(hint) = db_error.hint()
        && !hint.trim().is_empty()
    {
        message.push_str(&format!(" (hint: {})", hint));
    }

    format!("{} (code: {})", message, db_error.code().code())
}

/// The single destination connection a restore runs on.
///
/// The client sits behind an async mutex, so at most one request is in
/// flight at any time. Dropping the client on `close` ends the background
/// connection task.
pub struct PostgresConnection {
    client: Mutex<Option<Client>>,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect to the destination described by `target`
    #[tracing::instrument(skip_all, fields(host = %target.host(), port = target.port()))]
    pub async fn connect(target: &ConnectionTarget, options: &ConnectionOptions) -> Result<Self> {
        let tls_mode = options.tls().mode;
        tracing::info!(
            database = ?target.database(),
            username = %target.username(),
            tls_mode = ?tls_mode,
            pooler = target.is_pooler(),
            "connecting to PostgreSQL database"
        );

        let mut config: tokio_postgres::Config = target.as_str().parse().map_err(|e| {
            ZqlzError::Configuration(format!(
                "Invalid connection string: {}",
                format_postgres_error(&e)
            ))
        })?;
        config
            .connect_timeout(options.connect_timeout())
            .application_name(options.application_name())
            .ssl_mode(tls_mode_to_sslmode(tls_mode));

        let timeout = options.connect_timeout();
        let client = if tls_mode == TlsMode::Disable {
            let (client, connection) = tokio::time::timeout(timeout, config.connect(NoTls))
                .await
                .map_err(|_| connect_timeout_error(target, timeout))?
                .map_err(connect_error)?;
            spawn_connection_task(connection);
            client
        } else {
            let tls = PostgresTlsConnector::build(options.tls())
                .map_err(|e| ZqlzError::Security(e.to_string()))?;
            let (client, connection) = tokio::time::timeout(timeout, config.connect(tls))
                .await
                .map_err(|_| connect_timeout_error(target, timeout))?
                .map_err(connect_error)?;
            spawn_connection_task(connection);
            client
        };

        tracing::info!("PostgreSQL connection established");
        Ok(Self {
            client: Mutex::new(Some(client)),
            closed: AtomicBool::new(false),
        })
    }
}

fn connect_error(error: tokio_postgres::Error) -> ZqlzError {
    ZqlzError::Connection(format!(
        "Failed to connect to PostgreSQL: {}",
        format_postgres_error(&error)
    ))
}

fn connect_timeout_error(target: &ConnectionTarget, timeout: std::time::Duration) -> ZqlzError {
    ZqlzError::Timeout(format!(
        "connecting to {} did not complete within {}s",
        target,
        timeout.as_secs()
    ))
}

/// Drive the connection future until the client is dropped or the socket dies
fn spawn_connection_task<F>(connection: F)
where
    F: Future<Output = std::result::Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection error");
        }
    });
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgresql"
    }

    #[tracing::instrument(skip(self, sql), fields(sql_len = sql.len()))]
    async fn execute_script(&self, sql: &str) -> Result<()> {
        let guard = self.client.lock().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| ZqlzError::Connection("connection is closed".to_string()))?;

        client
            .batch_execute(sql)
            .await
            .map_err(|e| ZqlzError::Query(format_postgres_error(&e)))
    }

    #[tracing::instrument(skip(self, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str) -> Result<QueryResult> {
        let start_time = Instant::now();
        let guard = self.client.lock().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| ZqlzError::Connection("connection is closed".to_string()))?;

        let messages = client
            .simple_query(sql)
            .await
            .map_err(|e| ZqlzError::Query(format_postgres_error(&e)))?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(pg_row) = message {
                if columns.is_empty() {
                    columns = pg_row
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect();
                }
                let values = (0..pg_row.len())
                    .map(|idx| pg_row.get(idx).map(str::to_string))
                    .collect();
                rows.push(Row::new(columns.clone(), values));
            }
        }

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            execution_time_ms = execution_time_ms,
            "query executed successfully"
        );

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::info!("closing PostgreSQL connection");
        self.client.lock().await.take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
