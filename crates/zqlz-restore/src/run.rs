//! Per-run restoration state
//!
//! Every counter a restore accumulates lives in a [`RestorationRun`] value
//! that the engine threads through its stages, so two engines never share
//! state and each run starts from zero.

use std::fmt;

use crate::batch::BatchOptions;
use crate::error::{RestoreError, RestoreResult};

/// Lifecycle of a restoration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    /// The whole dump was submitted as one request
    WholeFileAttempt,
    /// The whole-dump request was accepted
    Succeeded,
    /// The dump is being replayed in batches
    BatchFallback,
    Completed,
    Aborted,
}

impl RunState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (NotStarted, WholeFileAttempt)
                | (NotStarted, BatchFallback)
                | (WholeFileAttempt, Succeeded)
                | (WholeFileAttempt, BatchFallback)
                | (WholeFileAttempt, Aborted)
                | (Succeeded, Completed)
                | (BatchFallback, Completed)
                | (BatchFallback, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not_started",
            RunState::WholeFileAttempt => "whole_file_attempt",
            RunState::Succeeded => "succeeded",
            RunState::BatchFallback => "batch_fallback",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// How a completed run got its statements into the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The dump went through as a single request
    WholeFile,
    /// The dump was tokenized and replayed batch by batch
    Batched,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::WholeFile => f.write_str("single transaction"),
            Strategy::Batched => f.write_str("batched"),
        }
    }
}

/// Why a run stopped before completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The whole-dump request failed with a non-capacity error
    Execution(String),
    /// Non-benign batch errors went past the tolerance threshold
    TooManyErrors { errors: usize, threshold: usize },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Execution(message) => write!(f, "{}", message),
            AbortReason::TooManyErrors { errors, threshold } => {
                write!(f, "too many errors ({} > {})", errors, threshold)
            }
        }
    }
}

/// Tagged result of a restoration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed {
        strategy: Strategy,
        /// Batches attempted; zero for a whole-file run
        batches: usize,
        /// Non-benign batch errors tolerated below the threshold
        errors: usize,
        /// Benign conflicts skipped
        benign: usize,
    },
    Aborted {
        reason: AbortReason,
        /// 1-based batch that tripped the abort, if batching had started
        batch_index: Option<usize>,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Convert an abort into its fatal error
    pub fn into_result(self) -> RestoreResult<Self> {
        match self {
            RunOutcome::Completed { .. } => Ok(self),
            RunOutcome::Aborted {
                reason: AbortReason::Execution(message),
                ..
            } => Err(RestoreError::Execution(message)),
            RunOutcome::Aborted {
                reason: AbortReason::TooManyErrors { errors, threshold },
                batch_index,
            } => Err(RestoreError::ThresholdExceeded {
                errors,
                threshold,
                batch_index: batch_index.unwrap_or_default(),
            }),
        }
    }
}

/// Counters and state for one restoration run
#[derive(Debug, Clone)]
pub struct RestorationRun {
    batch_size: usize,
    error_threshold: usize,
    progress_interval: usize,
    errors: usize,
    benign: usize,
    batches_attempted: usize,
    state: RunState,
}

impl RestorationRun {
    /// Start a run. A zero batch size or progress interval is treated as 1.
    pub fn new(options: &BatchOptions) -> Self {
        Self {
            batch_size: options.batch_size.max(1),
            error_threshold: options.error_threshold,
            progress_interval: options.progress_interval.max(1),
            errors: 0,
            benign: 0,
            batches_attempted: 0,
            state: RunState::NotStarted,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn error_threshold(&self) -> usize {
        self.error_threshold
    }

    pub fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    /// Cumulative non-benign error count
    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn benign(&self) -> usize {
        self.benign
    }

    pub fn batches_attempted(&self) -> usize {
        self.batches_attempted
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to the next lifecycle state
    pub fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "restoration state change");
        self.state = next;
    }

    pub fn record_batch_attempt(&mut self) {
        self.batches_attempted += 1;
    }

    pub fn record_benign(&mut self) {
        self.benign += 1;
    }

    /// Count a non-benign failure. Returns true once the threshold is
    /// exceeded.
    pub fn record_error(&mut self) -> bool {
        self.errors += 1;
        self.threshold_exceeded()
    }

    pub fn threshold_exceeded(&self) -> bool {
        self.errors > self.error_threshold
    }

    /// Final outcome for a run that finished without aborting
    pub fn completed(&mut self, strategy: Strategy) -> RunOutcome {
        self.advance(RunState::Completed);
        RunOutcome::Completed {
            strategy,
            batches: self.batches_attempted,
            errors: self.errors,
            benign: self.benign,
        }
    }

    pub fn aborted(&mut self, reason: AbortReason, batch_index: Option<usize>) -> RunOutcome {
        self.advance(RunState::Aborted);
        RunOutcome::Aborted {
            reason,
            batch_index,
        }
    }
}
