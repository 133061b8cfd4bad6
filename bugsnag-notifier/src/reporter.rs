// Error reporting orchestration
// Policy check, payload construction and fire-and-forget submission

use crate::connection::{ConnectionManager, SubmissionOutcome};
use bugsnag_core::{
    BugsnagConfig, BugsnagError, PayloadBuilder, ReportContext, ReportPolicy, Reportable,
    RequestSnapshot, Result,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Completion signal for a report that passed the policy check
pub type Completion = Box<dyn FnOnce(&SubmissionOutcome) + Send + 'static>;

/// What `report` did with an error
#[derive(Debug)]
pub enum ReportReceipt {
    /// Policy opted out. Nothing was submitted and no completion will run.
    Suppressed,
    /// Submission is running in the background
    Pending(JoinHandle<SubmissionOutcome>),
    /// Submission already finished (no runtime was available to defer it)
    Completed(SubmissionOutcome),
}

impl ReportReceipt {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, ReportReceipt::Suppressed)
    }

    /// Wait for the submission to finish. `None` for suppressed reports.
    pub async fn outcome(self) -> Option<SubmissionOutcome> {
        match self {
            ReportReceipt::Suppressed => None,
            ReportReceipt::Completed(outcome) => Some(outcome),
            ReportReceipt::Pending(handle) => Some(match handle.await {
                Ok(outcome) => outcome,
                Err(e) => SubmissionOutcome::Failed(BugsnagError::Other(anyhow::Error::new(e))),
            }),
        }
    }
}

/// Entry point of the pipeline.
///
/// Cheap to clone; clones share the same connection manager.
#[derive(Clone)]
pub struct Reporter {
    policy: ReportPolicy,
    builder: Arc<PayloadBuilder>,
    connection: Arc<ConnectionManager>,
}

impl Reporter {
    /// Reporter with a reqwest connection to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BugsnagError::Config`] when the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: &BugsnagConfig) -> Result<Self> {
        config.validate()?;
        let connection = ConnectionManager::new(config)?;
        Ok(Self::with_connection(config, connection))
    }

    pub fn with_connection(config: &BugsnagConfig, connection: ConnectionManager) -> Self {
        Self {
            policy: ReportPolicy::from_config(config),
            builder: Arc::new(PayloadBuilder::new(config)),
            connection: Arc::new(connection),
        }
    }

    pub fn policy(&self) -> &ReportPolicy {
        &self.policy
    }

    /// Report `error` without a completion callback.
    pub fn report(
        &self,
        error: &dyn Reportable,
        request: Option<&RequestSnapshot>,
        context: ReportContext,
    ) -> ReportReceipt {
        self.dispatch(error, request, context, None)
    }

    /// Report `error`; `completion` runs exactly once after submission
    /// finishes, whether it succeeded or not. It is dropped without being
    /// called when the policy suppresses the report.
    pub fn report_with<F>(
        &self,
        error: &dyn Reportable,
        request: Option<&RequestSnapshot>,
        context: ReportContext,
        completion: F,
    ) -> ReportReceipt
    where
        F: FnOnce(&SubmissionOutcome) + Send + 'static,
    {
        self.dispatch(error, request, context, Some(Box::new(completion)))
    }

    fn dispatch(
        &self,
        error: &dyn Reportable,
        request: Option<&RequestSnapshot>,
        context: ReportContext,
        completion: Option<Completion>,
    ) -> ReportReceipt {
        if !self.policy.should_report(error) {
            debug!(error = %error, "Error report suppressed by policy");
            return ReportReceipt::Suppressed;
        }

        let report_id = Uuid::new_v4();
        let payload = self.builder.build(error, request, context);
        info!(
            report_id = %report_id,
            error = %error,
            severity = ?payload.events.first().map(|event| event.severity),
            "Reporting error"
        );

        let Ok(handle) = Handle::try_current() else {
            warn!(report_id = %report_id, "No async runtime available, dropping error report");
            let outcome = SubmissionOutcome::Failed(BugsnagError::NoRuntime);
            if let Some(completion) = completion {
                completion(&outcome);
            }
            return ReportReceipt::Completed(outcome);
        };

        let connection = Arc::clone(&self.connection);
        ReportReceipt::Pending(handle.spawn(async move {
            let outcome = connection.submit(&payload).await;
            debug!(report_id = %report_id, delivered = outcome.is_delivered(), "Error report finished");
            if let Some(completion) = completion {
                completion(&outcome);
            }
            outcome
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use bugsnag_core::OpaqueError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> BugsnagConfig {
        BugsnagConfig::new("key").with_endpoint("https://notify.example.test")
    }

    #[test]
    fn test_without_runtime_completion_runs_inline() {
        let mut transport = MockTransport::new();
        transport.expect_post().never();
        let reporter = Reporter::with_connection(
            &config(),
            ConnectionManager::with_transport(&config(), Arc::new(transport)),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let error = OpaqueError::from(anyhow::anyhow!("no runtime"));
        let receipt = reporter.report_with(&error, None, ReportContext::new("test"), move |outcome| {
            assert!(matches!(outcome, SubmissionOutcome::Failed(BugsnagError::NoRuntime)));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(receipt, ReportReceipt::Completed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(Reporter::new(&BugsnagConfig::default()).is_err());
    }
}
