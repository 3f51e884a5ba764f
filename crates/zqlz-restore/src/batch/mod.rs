//! Batched statement replay
//!
//! Groups tokenized statements into fixed-size batches and executes them one
//! after another over a single connection. Each batch is one combined
//! request, so its statements share an implicit transaction while separate
//! batches do not.

mod executor;
#[cfg(test)]
mod tests;

pub use executor::{
    Batch, BatchExecutionResult, BatchExecutor, BatchFailure, BatchOptions, BatchStatus,
    FailureKind, group_into_batches,
};
