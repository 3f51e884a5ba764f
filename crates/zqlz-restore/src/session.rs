//! One restore from connectivity check to verification

use std::sync::Arc;
use std::time::{Duration, Instant};

use zqlz_core::{Connection, ErrorClassifier};

use crate::document::DumpDocument;
use crate::engine::RestorationEngine;
use crate::error::{RestoreError, RestoreResult};
use crate::options::RestoreOptions;
use crate::progress::{NoopProgress, ProgressListener};
use crate::run::RunOutcome;
use crate::verify::{VerificationReport, VerificationReporter};

/// What a successful session produced
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Always `RunOutcome::Completed`
    pub outcome: RunOutcome,
    /// `None` when verification was disabled; `Some(Err(..))` when it failed,
    /// which does not fail the restore
    pub verification: Option<Result<VerificationReport, String>>,
    pub elapsed: Duration,
}

impl RestoreReport {
    pub fn verification_report(&self) -> Option<&VerificationReport> {
        self.verification.as_ref().and_then(|v| v.as_ref().ok())
    }
}

/// Runs a restore over an already-open connection and always closes it
pub struct RestoreSession {
    options: RestoreOptions,
    listener: Arc<dyn ProgressListener>,
    classifier: Option<Arc<dyn ErrorClassifier>>,
}

impl RestoreSession {
    pub fn new(options: RestoreOptions) -> Self {
        Self {
            options,
            listener: Arc::new(NoopProgress),
            classifier: None,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn options(&self) -> &RestoreOptions {
        &self.options
    }

    /// Check the connection, restore `document`, then verify.
    ///
    /// The connection is closed before returning, whatever the result.
    pub async fn run(
        &self,
        conn: Arc<dyn Connection>,
        document: &DumpDocument,
    ) -> RestoreResult<RestoreReport> {
        let result = self.run_inner(Arc::clone(&conn), document).await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "failed to close destination connection");
        }
        result
    }

    async fn run_inner(
        &self,
        conn: Arc<dyn Connection>,
        document: &DumpDocument,
    ) -> RestoreResult<RestoreReport> {
        let started = Instant::now();

        conn.ping().await.map_err(RestoreError::connectivity)?;
        tracing::info!(driver = conn.driver_name(), "connected to destination");

        let mut engine = RestorationEngine::new(Arc::clone(&conn), self.options.clone())
            .with_listener(Arc::clone(&self.listener));
        if let Some(classifier) = &self.classifier {
            engine = engine.with_classifier(Arc::clone(classifier));
        }

        let outcome = engine.restore(document).await.into_result()?;

        let verification = if self.options.verify {
            let reporter = VerificationReporter::new(self.options.schema.clone());
            Some(match reporter.verify(conn.as_ref()).await {
                Ok(report) => Ok(report),
                Err(e) => {
                    tracing::warn!(error = %e, "verification failed");
                    Err(e.to_string())
                }
            })
        } else {
            None
        };

        Ok(RestoreReport {
            outcome,
            verification,
            elapsed: started.elapsed(),
        })
    }
}
