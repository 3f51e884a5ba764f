//! ZQLZ Restore - Replay SQL dumps against a fresh database
//!
//! The restore first submits the whole dump as one request. If the server
//! rejects it for size or memory reasons, the dump is split into statements
//! with a quote-aware tokenizer and replayed in fixed-size batches over the
//! same connection, tolerating re-run conflicts and aborting once too many
//! real errors accumulate. A verification pass then counts rows per table.

pub mod batch;
mod document;
mod engine;
mod error;
mod options;
mod progress;
mod run;
pub mod schema_extract;
mod session;
pub mod tokenizer;
mod verify;

pub use batch::{
    Batch, BatchExecutionResult, BatchExecutor, BatchFailure, BatchOptions, BatchStatus,
    FailureKind, group_into_batches,
};
pub use document::DumpDocument;
pub use engine::RestorationEngine;
pub use error::{RestoreError, RestoreResult, connectivity_hint};
pub use options::RestoreOptions;
pub use progress::{NoopProgress, ProgressListener, RestoreEvent, TracingProgress};
pub use run::{AbortReason, RestorationRun, RunOutcome, RunState, Strategy};
pub use schema_extract::{ExtractedSchema, extract_schema};
pub use session::{RestoreReport, RestoreSession};
pub use tokenizer::{QuoteState, Statement, split_statements, tokenize};
pub use verify::{TableSnapshot, VerificationReport, VerificationReporter};
