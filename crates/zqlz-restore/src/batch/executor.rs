//! Batch executor implementation

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use zqlz_core::{Connection, ErrorClassifier};

use crate::progress::{ProgressListener, RestoreEvent, percent_of};
use crate::run::RestorationRun;
use crate::tokenizer::Statement;

/// Default number of statements per batch
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// Default number of non-benign errors tolerated before aborting
pub const DEFAULT_ERROR_THRESHOLD: usize = 20;
/// Default statement interval between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;

/// Longest error message kept for a failed batch, in characters
const MAX_FAILURE_MESSAGE_CHARS: usize = 150;

/// Configuration options for batch execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Statements per batch
    pub batch_size: usize,
    /// Abort once the non-benign error count goes above this value
    pub error_threshold: usize,
    /// Report progress each time this many statements have been processed
    pub progress_interval: usize,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_error_threshold(mut self, threshold: usize) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// An ordered slice of statements executed as one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Position of this batch (1-based, for reporting)
    pub index: usize,
    /// Number of statements that precede this batch
    pub offset: usize,
    pub statements: &'a [Statement],
}

impl Batch<'_> {
    /// Combined SQL for the batch. Statements keep their own terminators.
    pub fn sql(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Statements processed once this batch has run
    pub fn end(&self) -> usize {
        self.offset + self.statements.len()
    }
}

/// Partition statements into order-preserving batches of `capacity`
pub fn group_into_batches(statements: &[Statement], capacity: usize) -> Vec<Batch<'_>> {
    let capacity = capacity.max(1);
    statements
        .chunks(capacity)
        .enumerate()
        .map(|(i, chunk)| Batch {
            index: i + 1,
            offset: i * capacity,
            statements: chunk,
        })
        .collect()
}

/// How a failed batch was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The objects already existed; expected when re-running a restore
    BenignConflict,
    /// Counts toward the abort threshold
    Execution,
}

/// Status of a single batch after execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Succeeded,
    Failed(FailureKind),
    /// Never attempted because the run aborted first
    Skipped,
}

/// A failed batch and its (truncated) error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub kind: FailureKind,
    pub message: String,
}

impl BatchFailure {
    pub fn new(batch_index: usize, kind: FailureKind, message: &str) -> Self {
        Self {
            batch_index,
            kind,
            message: message.chars().take(MAX_FAILURE_MESSAGE_CHARS).collect(),
        }
    }

    pub fn is_benign(&self) -> bool {
        self.kind == FailureKind::BenignConflict
    }
}

/// Result of replaying every batch
#[derive(Debug, Clone, Default)]
pub struct BatchExecutionResult {
    /// One status per batch, in order
    pub statuses: Vec<BatchStatus>,
    pub failures: Vec<BatchFailure>,
    pub total_statements: usize,
    /// Batch that tripped the error threshold, if any
    pub aborted_at: Option<usize>,
    pub total_execution_time: Duration,
}

impl BatchExecutionResult {
    pub fn batch_count(&self) -> usize {
        self.statuses.len()
    }

    pub fn attempted_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| **s != BatchStatus::Skipped)
            .count()
    }

    pub fn success_count(&self) -> usize {
        self.count(BatchStatus::Succeeded)
    }

    pub fn benign_count(&self) -> usize {
        self.count(BatchStatus::Failed(FailureKind::BenignConflict))
    }

    pub fn error_count(&self) -> usize {
        self.count(BatchStatus::Failed(FailureKind::Execution))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(BatchStatus::Skipped)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    /// Failures that counted toward the threshold
    pub fn error_failures(&self) -> impl Iterator<Item = &BatchFailure> {
        self.failures.iter().filter(|f| !f.is_benign())
    }

    fn count(&self, status: BatchStatus) -> usize {
        self.statuses.iter().filter(|s| **s == status).count()
    }
}

/// Sequential batch executor
///
/// Holds no configuration: batch size, error threshold and progress
/// interval all come from the [`RestorationRun`] being executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor;

impl BatchExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Replay `statements` in batches, recording every outcome on `run`.
    ///
    /// Execution stops before the next batch once the run's non-benign
    /// error count exceeds its threshold.
    #[tracing::instrument(
        skip_all,
        fields(statements = statements.len(), batch_size = run.batch_size())
    )]
    pub async fn execute(
        &self,
        conn: &dyn Connection,
        classifier: &dyn ErrorClassifier,
        run: &mut RestorationRun,
        statements: &[Statement],
        listener: &dyn ProgressListener,
    ) -> BatchExecutionResult {
        let started = Instant::now();
        let batches = group_into_batches(statements, run.batch_size());
        let last_index = batches.len();
        let interval = run.progress_interval();

        let mut result = BatchExecutionResult {
            statuses: Vec::with_capacity(batches.len()),
            total_statements: statements.len(),
            ..BatchExecutionResult::default()
        };

        for batch in &batches {
            if result.is_aborted() {
                result.statuses.push(BatchStatus::Skipped);
                continue;
            }

            run.record_batch_attempt();
            match conn.execute_script(&batch.sql()).await {
                Ok(()) => result.statuses.push(BatchStatus::Succeeded),
                Err(e) => {
                    let message = e.message();
                    let (kind, exceeded) = if classifier.is_benign_conflict(&message) {
                        run.record_benign();
                        (FailureKind::BenignConflict, false)
                    } else {
                        (FailureKind::Execution, run.record_error())
                    };

                    let failure = BatchFailure::new(batch.index, kind, &message);
                    listener.on_event(&RestoreEvent::BatchFailed {
                        batch_index: failure.batch_index,
                        benign: failure.is_benign(),
                        message: failure.message.clone(),
                    });
                    result.statuses.push(BatchStatus::Failed(kind));
                    result.failures.push(failure);

                    if exceeded {
                        tracing::error!(
                            batch_index = batch.index,
                            errors = run.errors(),
                            threshold = run.error_threshold(),
                            "too many errors, stopping import"
                        );
                        result.aborted_at = Some(batch.index);
                        continue;
                    }
                }
            }

            if batch.end() % interval == 0 || batch.index == last_index {
                listener.on_event(&RestoreEvent::BatchProgress {
                    processed: batch.end(),
                    total: statements.len(),
                    percent: percent_of(batch.end(), statements.len()),
                });
            }
        }

        result.total_execution_time = started.elapsed();
        tracing::debug!(
            attempted = result.attempted_count(),
            succeeded = result.success_count(),
            benign = result.benign_count(),
            errors = result.error_count(),
            elapsed_ms = result.total_execution_time.as_millis() as u64,
            "batch replay finished"
        );
        result
    }
}
