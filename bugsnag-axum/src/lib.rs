//! Axum integration for Bugsnag error reporting
//!
//! [`report_errors`] wraps a router, captures each request on entry and
//! reports failures found on the way out: errors attached to the response by
//! [`ApiError`] or [`Reported`], and any 5xx response without one. Responses
//! are passed through untouched.
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use bugsnag_axum::{report_errors, ApiError, ReportState};
//! use bugsnag_core::BugsnagConfig;
//! use bugsnag_notifier::Reporter;
//!
//! async fn checkout() -> Result<&'static str, ApiError> {
//!     Err(ApiError::internal("payment gateway unreachable"))
//! }
//!
//! # fn build() -> anyhow::Result<Router> {
//! let reporter = Reporter::new(&BugsnagConfig::from_env()?)?;
//! let app = Router::new()
//!     .route("/checkout", get(checkout))
//!     .layer(from_fn_with_state(ReportState::new(reporter), report_errors));
//! # Ok(app)
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod telemetry;

pub use error::{ApiError, ApiErrorResponse, ApiResult, Reported};
pub use middleware::{
    report_errors, AttachedError, ReportState, ReportUser, UnhandledStatus, DEFAULT_MAX_BODY_BYTES,
};
pub use telemetry::init_tracing;
