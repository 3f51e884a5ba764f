//! Discover dump files in a directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A candidate `.sql` dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}

impl DumpEntry {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Non-empty `.sql` files directly inside `dir`, largest first
pub fn list_dumps(dir: &Path) -> Result<Vec<DumpEntry>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut dumps = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let path = entry.path();
        let is_sql = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if !is_sql {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() || metadata.len() == 0 {
            continue;
        }

        dumps.push(DumpEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: metadata.len(),
            path,
        });
    }

    dumps.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.name.cmp(&b.name)));
    Ok(dumps)
}
