//! Post-restore row-count audit

use zqlz_core::Connection;

use crate::error::{RestoreError, RestoreResult};
use crate::options::DEFAULT_SCHEMA;

/// One table and its row count, if it could be counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub name: String,
    /// `None` when the count query failed
    pub row_count: Option<u64>,
}

impl TableSnapshot {
    pub fn is_counted(&self) -> bool {
        self.row_count.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationReport {
    pub schema: String,
    /// Base tables ordered by name
    pub tables: Vec<TableSnapshot>,
}

impl VerificationReport {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Sum of every row count that could be taken
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().filter_map(|t| t.row_count).sum()
    }

    pub fn unavailable_count(&self) -> usize {
        self.tables.iter().filter(|t| !t.is_counted()).count()
    }

    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Counts rows in every base table of a schema
#[derive(Debug, Clone)]
pub struct VerificationReporter {
    schema: String,
}

impl Default for VerificationReporter {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA)
    }
}

impl VerificationReporter {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Enumerate base tables and count their rows.
    ///
    /// A table whose count fails is reported with `row_count: None`; only a
    /// failure to list the tables is an error.
    #[tracing::instrument(skip_all, fields(schema = %self.schema))]
    pub async fn verify(&self, conn: &dyn Connection) -> RestoreResult<VerificationReport> {
        let listing = conn
            .query(&list_tables_sql(&self.schema))
            .await
            .map_err(|e| RestoreError::Verification(e.message()))?;

        let names: Vec<String> = listing
            .rows
            .iter()
            .filter_map(|row| row.get(0).map(str::to_string))
            .collect();
        tracing::info!(tables = names.len(), "found tables");

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let row_count = match conn.query(&count_rows_sql(&self.schema, &name)).await {
                Ok(result) => result.rows.first().and_then(|row| row.get_u64(0)),
                Err(e) => {
                    tracing::warn!(table = %name, error = %e, "could not count rows");
                    None
                }
            };
            tables.push(TableSnapshot { name, row_count });
        }

        Ok(VerificationReport {
            schema: self.schema.clone(),
            tables,
        })
    }
}

fn list_tables_sql(schema: &str) -> String {
    format!(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = {} AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
        quote_literal(schema)
    )
}

fn count_rows_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {}.{}",
        quote_identifier(schema),
        quote_identifier(table)
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
