//! Report policy, wire model and payload construction for the Bugsnag bridge
//!
//! This crate holds the pure half of the error reporting pipeline: deciding
//! whether an error is reported, at what severity, and turning it into the
//! versioned JSON payload accepted by the notification endpoint. Nothing in
//! here performs I/O.
//!
//! # Example
//!
//! ```rust
//! use bugsnag_core::{BugsnagConfig, OpaqueError, PayloadBuilder, ReportContext, ReportPolicy};
//!
//! let config = BugsnagConfig::new("your-api-key").with_key_filters(["password"]);
//! let policy = ReportPolicy::from_config(&config);
//! let builder = PayloadBuilder::new(&config);
//!
//! let error = OpaqueError::from(anyhow::anyhow!("database unreachable"));
//! if policy.should_report(&error) {
//!     let payload = builder.build(&error, None, ReportContext::new("checkout"));
//!     assert_eq!(payload.events.len(), 1);
//! }
//! ```

pub mod body_filter;
pub mod breadcrumbs;
pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod metadata;
pub mod payload;
pub mod policy;
pub mod reportable;
pub mod request;
pub mod severity;

pub use body_filter::BodyFilter;
pub use breadcrumbs::{Breadcrumb, BreadcrumbTrail, BreadcrumbType};
pub use builder::{PayloadBuilder, FALLBACK_MESSAGE};
pub use self::config::BugsnagConfig;
pub use context::ReportContext;
pub use error::{BugsnagError, Result};
pub use metadata::Metadata;
pub use payload::*;
pub use policy::ReportPolicy;
pub use reportable::{OpaqueError, Reportable};
pub use request::{PeerInfo, RequestSnapshot};
pub use severity::Severity;

// Re-exported so error types can name statuses without a direct dependency
pub use http::StatusCode;
