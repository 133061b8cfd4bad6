use crate::transport::{ReqwestTransport, Transport};
use bugsnag_core::{BugsnagConfig, BugsnagError, Payload, Result};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How a single submission finished
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Endpoint accepted the payload
    Delivered { status: u16 },
    /// Submission failed; the failure is only ever logged
    Failed(BugsnagError),
}

impl SubmissionOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SubmissionOutcome::Delivered { .. })
    }

    pub fn error(&self) -> Option<&BugsnagError> {
        match self {
            SubmissionOutcome::Failed(e) => Some(e),
            SubmissionOutcome::Delivered { .. } => None,
        }
    }
}

/// Owns the outbound channel to the notification endpoint.
///
/// Configuration is fixed at construction and the transport is only used
/// through `&self`, so one manager serves every concurrent report.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    endpoint: String,
    api_key: String,
    payload_version: String,
    timeout: Duration,
}

impl ConnectionManager {
    /// Connection manager backed by a reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`BugsnagError::Config`] when the HTTP client cannot be built.
    pub fn new(config: &BugsnagConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &BugsnagConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            payload_version: config.payload_version.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serialize and send `payload`. Never returns an error; failures are
    /// logged and reported through the outcome.
    pub async fn submit(&self, payload: &Payload) -> SubmissionOutcome {
        match self.try_submit(payload).await {
            Ok(status) => {
                debug!(endpoint = %self.endpoint, status, "Error report delivered");
                SubmissionOutcome::Delivered { status }
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Error report submission failed");
                SubmissionOutcome::Failed(e)
            }
        }
    }

    async fn try_submit(&self, payload: &Payload) -> Result<u16> {
        let body = payload.to_json()?;

        let status = tokio::time::timeout(
            self.timeout,
            self.transport.post(&self.endpoint, self.headers(), body),
        )
        .await
        .map_err(|_| BugsnagError::Timeout(self.timeout))??;

        if !(200..300).contains(&status) {
            return Err(BugsnagError::Status(status));
        }
        Ok(status)
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Bugsnag-Api-Key".to_string(), self.api_key.clone()),
            ("Bugsnag-Payload-Version".to_string(), self.payload_version.clone()),
            (
                "Bugsnag-Sent-At".to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]
    }
}
