//! Schema-only extraction
//!
//! Pulls the `CREATE TABLE` blocks out of a dump into a small standalone
//! script, useful for a dry run of the table layout before a full restore.
//!
//! This does not go through the tokenizer. A block is matched from
//! `CREATE TABLE` up to the first `;`, quoted or not, so a default value such
//! as `DEFAULT 'a;b'` cuts the block short.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

use crate::document::DumpDocument;
use crate::error::{RestoreError, RestoreResult};

static CREATE_TABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CREATE TABLE[^;]+;").expect("valid regex"));

/// Where the schema was written and how many tables it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSchema {
    pub path: PathBuf,
    pub table_count: usize,
}

/// Every `CREATE TABLE ...;` block in `content`, in order
pub fn extract_create_tables(content: &str) -> Vec<&str> {
    CREATE_TABLE_REGEX
        .find_iter(content)
        .map(|m| m.as_str())
        .collect()
}

/// Render the schema script for `blocks` extracted from `source`
pub fn render_schema_document(source: &Path, blocks: &[&str], generated_at: DateTime<Utc>) -> String {
    format!(
        "-- Schema extracted from: {}\n\
         -- Generated: {}\n\
         -- This file contains only CREATE TABLE statements (no data)\n\
         \n\
         BEGIN;\n\
         \n\
         {}\n\
         \n\
         COMMIT;\n",
        source.display(),
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        blocks.join("\n\n")
    )
}

/// `schema-only-<unix millis>.sql` in the dump's directory
pub fn default_output_path(dump_path: &Path, now: DateTime<Utc>) -> PathBuf {
    let file_name = format!("schema-only-{}.sql", now.timestamp_millis());
    match dump_path.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Write the `CREATE TABLE` blocks of `document` to `output`, or to
/// [`default_output_path`] when no output is given
#[tracing::instrument(skip_all, fields(source = %document.path().display()))]
pub fn extract_schema(
    document: &DumpDocument,
    output: Option<&Path>,
) -> RestoreResult<ExtractedSchema> {
    let now = Utc::now();
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(document.path(), now),
    };

    let blocks = extract_create_tables(document.content());
    let script = render_schema_document(document.path(), &blocks, now);

    fs::write(&path, script).map_err(|source| RestoreError::Output {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        tables = blocks.len(),
        output = %path.display(),
        "schema extracted"
    );
    Ok(ExtractedSchema {
        path,
        table_count: blocks.len(),
    })
}
