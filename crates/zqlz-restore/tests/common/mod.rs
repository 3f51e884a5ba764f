//! Common test utilities and mocks

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use zqlz_core::{Connection, QueryResult, Result, ZqlzError};
use zqlz_restore::ProgressListener;
use zqlz_restore::RestoreEvent;

/// Mock destination for exercising the restore engine without a database.
///
/// Scripts can be failed by call number or by SQL pattern. Successful
/// scripts are applied to a tiny in-memory catalogue: `CREATE TABLE <name>`
/// registers a table and every `INSERT INTO <name>` adds one row, which the
/// verification queries then report back.
#[derive(Default)]
pub struct MockConnection {
    /// Fail the n-th `execute_script` call (0-based) with the message
    pub script_failures_by_call: Vec<(usize, String)>,
    /// Fail any script containing the pattern with the message
    pub script_failures_by_pattern: Vec<(String, String)>,
    /// Fail any query containing the pattern with the message
    pub query_failures: Vec<(String, String)>,
    /// SQL-pattern-based responses, checked before the catalogue
    pub query_responses: Vec<(String, QueryResult)>,
    pub script_log: Arc<Mutex<Vec<String>>>,
    pub query_log: Arc<Mutex<Vec<String>>>,
    pub tables: Arc<Mutex<BTreeMap<String, u64>>>,
    script_calls: AtomicUsize,
    close_calls: AtomicUsize,
    closed: AtomicBool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script_failure_on_call(mut self, call: usize, message: impl Into<String>) -> Self {
        self.script_failures_by_call.push((call, message.into()));
        self
    }

    pub fn with_script_failure_when(
        mut self,
        sql_contains: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.script_failures_by_pattern
            .push((sql_contains.into(), message.into()));
        self
    }

    pub fn with_query_failure_when(
        mut self,
        sql_contains: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.query_failures
            .push((sql_contains.into(), message.into()));
        self
    }

    /// Register a response for queries containing the given SQL pattern.
    pub fn with_query_response(
        mut self,
        sql_contains: impl Into<String>,
        result: QueryResult,
    ) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn script_log(&self) -> Vec<String> {
        self.script_log.lock().clone()
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }

    pub fn script_count(&self) -> usize {
        self.script_calls.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn row_count(&self, table: &str) -> Option<u64> {
        self.tables.lock().get(table).copied()
    }

    fn apply(&self, sql: &str) {
        let mut tables = self.tables.lock();
        for fragment in sql.split(';') {
            let fragment = fragment.trim_start();
            if let Some(rest) = fragment.strip_prefix("CREATE TABLE ") {
                if let Some(name) = table_name(rest) {
                    tables.entry(name).or_insert(0);
                }
            } else if let Some(rest) = fragment.strip_prefix("INSERT INTO ")
                && let Some(name) = table_name(rest)
            {
                *tables.entry(name).or_insert(0) += 1;
            }
        }
    }

    fn catalogue_response(&self, sql: &str) -> QueryResult {
        let tables = self.tables.lock();
        if sql.contains("information_schema.tables") {
            return QueryResult::from_rows(
                vec!["table_name".into()],
                tables.keys().map(|name| vec![Some(name.clone())]).collect(),
            );
        }
        if let Some(target) = sql.strip_prefix("SELECT COUNT(*) FROM ") {
            let name = target
                .rsplit("\".\"")
                .next()
                .unwrap_or_default()
                .trim_end_matches('"')
                .replace("\"\"", "\"");
            return match tables.get(&name) {
                Some(count) => {
                    QueryResult::from_rows(vec!["count".into()], vec![vec![Some(count.to_string())]])
                }
                None => QueryResult::empty(),
            };
        }
        QueryResult::from_rows(vec!["?column?".into()], vec![vec![Some("1".into())]])
    }
}

fn table_name(rest: &str) -> Option<String> {
    let raw = rest
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .filter(|name| !name.is_empty())?;
    let name = raw.rsplit('.').next().unwrap_or(raw);
    Some(name.trim_matches('"').to_string())
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn execute_script(&self, sql: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ZqlzError::Connection("Connection is closed".into()));
        }
        let call = self.script_calls.fetch_add(1, Ordering::SeqCst);
        self.script_log.lock().push(sql.to_string());

        if let Some((_, message)) = self.script_failures_by_call.iter().find(|(n, _)| *n == call) {
            return Err(ZqlzError::Query(message.clone()));
        }
        for (pattern, message) in &self.script_failures_by_pattern {
            if sql.contains(pattern.as_str()) {
                return Err(ZqlzError::Query(message.clone()));
            }
        }

        self.apply(sql);
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<QueryResult> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ZqlzError::Connection("Connection is closed".into()));
        }
        self.query_log.lock().push(sql.to_string());

        for (pattern, message) in &self.query_failures {
            if sql.contains(pattern.as_str()) {
                return Err(ZqlzError::Query(message.clone()));
            }
        }
        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }
        Ok(self.catalogue_response(sql))
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Progress listener that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<RestoreEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<RestoreEvent> {
        self.events.lock().clone()
    }

    pub fn progress_reports(&self) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RestoreEvent::BatchProgress {
                    processed, total, ..
                } => Some((processed, total)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressListener for RecordingProgress {
    fn on_event(&self, event: &RestoreEvent) {
        self.events.lock().push(event.clone());
    }
}

/// A dump of `count` single-row inserts into `items`, preceded by its table
pub fn insert_dump(count: usize) -> String {
    let mut dump = String::from("CREATE TABLE public.items (id integer, note text);\n");
    for i in 0..count.saturating_sub(1) {
        dump.push_str(&format!("INSERT INTO public.items VALUES ({}, 'row {};');\n", i, i));
    }
    dump
}

/// A dump that creates each table and then inserts its rows, table by table.
/// Yields one statement per table plus one per row.
pub fn multi_table_dump(tables: &[(&str, usize)]) -> String {
    let mut dump = String::new();
    for (name, _) in tables {
        dump.push_str(&format!("CREATE TABLE public.{} (id integer, note text);\n", name));
    }
    for (name, rows) in tables {
        for i in 0..*rows {
            dump.push_str(&format!(
                "INSERT INTO public.{} VALUES ({}, '{} {};');\n",
                name, i, name, i
            ));
        }
    }
    dump
}

/// Initialise test logging once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
