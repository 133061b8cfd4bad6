//! Delivery of crash reports to Bugsnag
//!
//! [`Reporter`] consults the report policy, builds the payload and hands it to
//! the [`ConnectionManager`], which posts it to the notification endpoint in
//! the background. Delivery is best effort: failures are logged and surfaced
//! only through [`SubmissionOutcome`], never to the code that raised the
//! original error.
//!
//! # Example
//!
//! ```rust,no_run
//! use bugsnag_core::{BugsnagConfig, OpaqueError, ReportContext};
//! use bugsnag_notifier::Reporter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reporter = Reporter::new(&BugsnagConfig::from_env()?)?;
//!
//!     let error = OpaqueError::from(anyhow::anyhow!("payment gateway unreachable"));
//!     let receipt = reporter.report_with(&error, None, ReportContext::new("charge_card"), |outcome| {
//!         tracing::info!(delivered = outcome.is_delivered(), "report finished");
//!     });
//!
//!     // Optional: wait for delivery, e.g. before shutdown
//!     receipt.outcome().await;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod reporter;
pub mod transport;

pub use connection::{ConnectionManager, SubmissionOutcome};
pub use reporter::{Completion, ReportReceipt, Reporter};
pub use transport::{ReqwestTransport, Transport};
