//! Connection trait

use crate::{QueryResult, Result};
use async_trait::async_trait;

/// A connection to the destination database.
///
/// Both methods use the simple query protocol: the SQL text may contain
/// several statements, which the server runs inside one implicit
/// transaction. No parameters are bound; dumps are replayed verbatim.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgresql")
    fn driver_name(&self) -> &str;

    /// Execute one or more statements as a single request, discarding any rows
    async fn execute_script(&self, sql: &str) -> Result<()>;

    /// Execute a query and collect its rows as text
    async fn query(&self, sql: &str) -> Result<QueryResult>;

    /// Round-trip a trivial query to confirm the connection is usable
    async fn ping(&self) -> Result<()> {
        self.query("SELECT 1").await.map(|_| ())
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
