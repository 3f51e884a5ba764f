//! Restore progress events
//!
//! The engine reports coarse checkpoints through a [`ProgressListener`].
//! Listeners only observe; nothing they do feeds back into the run.

use crate::run::Strategy;

/// A checkpoint reached during a restore
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreEvent {
    /// The whole dump is about to be submitted as one request
    WholeFileStarted { bytes: usize },
    WholeFileSucceeded,
    /// The whole-dump request hit a capacity limit, or batching was forced
    FallingBack { reason: String },
    /// The dump was split into statements and grouped into batches
    Tokenized { statements: usize, batches: usize },
    BatchProgress {
        processed: usize,
        total: usize,
        percent: f64,
    },
    BatchFailed {
        batch_index: usize,
        benign: bool,
        message: String,
    },
    Completed {
        strategy: Strategy,
        batches: usize,
        errors: usize,
        benign: usize,
    },
    Aborted {
        reason: String,
        batch_index: Option<usize>,
    },
}

/// Receives restore checkpoints
pub trait ProgressListener: Send + Sync {
    fn on_event(&self, event: &RestoreEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressListener for NoopProgress {
    fn on_event(&self, _event: &RestoreEvent) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressListener for TracingProgress {
    fn on_event(&self, event: &RestoreEvent) {
        match event {
            RestoreEvent::WholeFileStarted { bytes } => {
                tracing::info!(bytes, "executing dump as a single transaction")
            }
            RestoreEvent::WholeFileSucceeded => {
                tracing::info!("all statements executed successfully")
            }
            RestoreEvent::FallingBack { reason } => {
                tracing::warn!(%reason, "splitting dump into batches")
            }
            RestoreEvent::Tokenized {
                statements,
                batches,
            } => tracing::info!(statements, batches, "dump tokenized"),
            RestoreEvent::BatchProgress {
                processed,
                total,
                percent,
            } => tracing::info!(
                processed,
                total,
                percent = %format!("{:.1}", percent),
                "batch progress"
            ),
            RestoreEvent::BatchFailed {
                batch_index,
                benign: true,
                message,
            } => tracing::debug!(batch_index, %message, "batch conflict tolerated"),
            RestoreEvent::BatchFailed {
                batch_index,
                benign: false,
                message,
            } => tracing::error!(batch_index, %message, "error in batch"),
            RestoreEvent::Completed {
                strategy,
                batches,
                errors,
                benign,
            } => tracing::info!(%strategy, batches, errors, benign, "import completed"),
            RestoreEvent::Aborted {
                reason,
                batch_index,
            } => tracing::error!(%reason, ?batch_index, "import aborted"),
        }
    }
}

/// Percentage of `processed` over `total`, capped at 100
pub(crate) fn percent_of(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64 * 100.0).min(100.0)
}
