//! Restoration engine
//!
//! Drives one run through its states:
//!
//! ```text
//! NotStarted -> WholeFileAttempt -> Succeeded -----> Completed
//!                      |
//!                      +-- capacity error --> BatchFallback -> Completed | Aborted
//!                      +-- any other error -----------------> Aborted
//! ```
//!
//! With `force_batches` the whole-file attempt is skipped and the run goes
//! from `NotStarted` straight to `BatchFallback`.

use std::sync::Arc;

use zqlz_core::{Connection, ErrorClassifier, PatternClassifier};

use crate::batch::BatchExecutor;
use crate::document::DumpDocument;
use crate::options::RestoreOptions;
use crate::progress::{NoopProgress, ProgressListener, RestoreEvent};
use crate::run::{AbortReason, RestorationRun, RunOutcome, RunState, Strategy};
use crate::tokenizer::tokenize;

/// Replays a dump against one destination connection
#[derive(Clone)]
pub struct RestorationEngine {
    connection: Arc<dyn Connection>,
    classifier: Arc<dyn ErrorClassifier>,
    listener: Arc<dyn ProgressListener>,
    options: RestoreOptions,
}

impl RestorationEngine {
    /// Create an engine using PostgreSQL error wording and no progress output
    pub fn new(connection: Arc<dyn Connection>, options: RestoreOptions) -> Self {
        Self {
            connection,
            classifier: Arc::new(PatternClassifier::postgres()),
            listener: Arc::new(NoopProgress),
            options,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn options(&self) -> &RestoreOptions {
        &self.options
    }

    /// Restore `document` into the destination.
    ///
    /// Never retries a failed whole-file attempt unless the classifier calls
    /// the failure a capacity error. The returned outcome is final; use
    /// [`RunOutcome::into_result`] to turn an abort into an error.
    #[tracing::instrument(
        skip_all,
        fields(path = %document.path().display(), bytes = document.byte_size())
    )]
    pub async fn restore(&self, document: &DumpDocument) -> RunOutcome {
        let mut run = RestorationRun::new(&self.options.batch);
        let outcome = self.drive(&mut run, document).await;

        let event = match &outcome {
            RunOutcome::Completed {
                strategy,
                batches,
                errors,
                benign,
            } => RestoreEvent::Completed {
                strategy: *strategy,
                batches: *batches,
                errors: *errors,
                benign: *benign,
            },
            RunOutcome::Aborted {
                reason,
                batch_index,
            } => RestoreEvent::Aborted {
                reason: reason.to_string(),
                batch_index: *batch_index,
            },
        };
        self.listener.on_event(&event);
        outcome
    }

    async fn drive(&self, run: &mut RestorationRun, document: &DumpDocument) -> RunOutcome {
        if self.options.force_batches {
            self.listener.on_event(&RestoreEvent::FallingBack {
                reason: "batch mode requested".to_string(),
            });
            run.advance(RunState::BatchFallback);
            return self.replay_in_batches(run, document).await;
        }

        run.advance(RunState::WholeFileAttempt);
        self.listener.on_event(&RestoreEvent::WholeFileStarted {
            bytes: document.byte_size(),
        });

        match self.connection.execute_script(document.content()).await {
            Ok(()) => {
                run.advance(RunState::Succeeded);
                self.listener.on_event(&RestoreEvent::WholeFileSucceeded);
                run.completed(Strategy::WholeFile)
            }
            Err(e) => {
                let message = e.message();
                if self.classifier.is_capacity_error(&message) {
                    tracing::warn!(error = %message, "dump too large for a single transaction");
                    self.listener
                        .on_event(&RestoreEvent::FallingBack { reason: message });
                    run.advance(RunState::BatchFallback);
                    self.replay_in_batches(run, document).await
                } else {
                    tracing::error!(error = %message, "whole-file restore failed");
                    run.aborted(AbortReason::Execution(message), None)
                }
            }
        }
    }

    async fn replay_in_batches(
        &self,
        run: &mut RestorationRun,
        document: &DumpDocument,
    ) -> RunOutcome {
        let statements = tokenize(document.content());
        self.listener.on_event(&RestoreEvent::Tokenized {
            statements: statements.len(),
            batches: statements.len().div_ceil(run.batch_size()),
        });

        let executor = BatchExecutor::new();
        let result = executor
            .execute(
                self.connection.as_ref(),
                self.classifier.as_ref(),
                run,
                &statements,
                self.listener.as_ref(),
            )
            .await;

        match result.aborted_at {
            Some(batch_index) => {
                let reason = AbortReason::TooManyErrors {
                    errors: run.errors(),
                    threshold: run.error_threshold(),
                };
                run.aborted(reason, Some(batch_index))
            }
            None => run.completed(Strategy::Batched),
        }
    }
}
