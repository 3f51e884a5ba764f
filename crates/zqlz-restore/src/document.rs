//! The dump being restored

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{RestoreError, RestoreResult};

/// Immutable raw text of a SQL dump.
///
/// Read once per run: the file is opened, read in full and closed inside
/// `read`, so no file handle outlives document construction.
#[derive(Debug, Clone)]
pub struct DumpDocument {
    path: PathBuf,
    content: String,
}

impl DumpDocument {
    /// Read and validate a dump file.
    ///
    /// Missing, empty, whitespace-only and non-UTF-8 files are rejected
    /// before any database work starts.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read(path: impl AsRef<Path>) -> RestoreResult<Self> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RestoreError::DumpNotFound(path.to_path_buf()),
            _ => RestoreError::DumpUnreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if bytes.is_empty() {
            return Err(RestoreError::DumpEmpty(path.to_path_buf()));
        }

        let content =
            String::from_utf8(bytes).map_err(|_| RestoreError::DumpNotUtf8(path.to_path_buf()))?;

        let document = Self::from_string(path, content)?;
        tracing::info!(
            size_mb = %format!("{:.2}", document.size_mb()),
            "backup file loaded"
        );
        Ok(document)
    }

    /// Build a document from text already in memory
    pub fn from_string(path: impl Into<PathBuf>, content: impl Into<String>) -> RestoreResult<Self> {
        let path = path.into();
        let content = content.into();
        if content.trim().is_empty() {
            return Err(RestoreError::DumpEmpty(path));
        }
        Ok(Self { path, content })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn byte_size(&self) -> usize {
        self.content.len()
    }

    /// Size in mebibytes, for progress output
    pub fn size_mb(&self) -> f64 {
        self.byte_size() as f64 / (1024.0 * 1024.0)
    }
}
