//! Restore configuration

use serde::{Deserialize, Serialize};

use crate::batch::BatchOptions;

pub const DEFAULT_SCHEMA: &str = "public";

/// Options for a restoration run.
///
/// Deserializes from a flat table, so a settings file can hold
/// `batch_size`, `error_threshold` and `schema` side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreOptions {
    #[serde(flatten)]
    pub batch: BatchOptions,
    /// Schema whose tables are counted during verification
    pub schema: String,
    /// Skip the whole-file attempt and replay in batches straight away
    pub force_batches: bool,
    /// Run the row-count verification after a completed restore
    pub verify: bool,
}

impl RestoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_options(mut self, batch: BatchOptions) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_force_batches(mut self, force: bool) -> Self {
        self.force_batches = force;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            batch: BatchOptions::default(),
            schema: DEFAULT_SCHEMA.to_string(),
            force_batches: false,
            verify: true,
        }
    }
}
