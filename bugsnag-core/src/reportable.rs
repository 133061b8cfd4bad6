//! Capability trait consulted by the policy and the payload builder.
//!
//! Every query is optional. An error type opts into a capability by
//! overriding the matching method; everything else falls back to a
//! neutral default so that any `std::error::Error` can be reported.

use crate::severity::Severity;
use http::StatusCode;
use std::collections::BTreeMap;
use std::fmt;

/// An error that can be turned into a crash report.
pub trait Reportable: std::error::Error + Send + Sync {
    /// Human readable debug reason, used as the exception message.
    fn reason(&self) -> Option<String> {
        None
    }

    /// HTTP-like status. Drives the exception type label and the severity.
    fn status(&self) -> Option<StatusCode> {
        None
    }

    /// Structured metadata attached by the error itself.
    ///
    /// Values are flattened to strings; `null` values are dropped.
    fn metadata(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        None
    }

    /// Explicit report decision. `Some(false)` suppresses, `Some(true)` forces.
    fn should_report(&self) -> Option<bool> {
        None
    }

    /// Explicit severity, taking precedence over the status class.
    fn severity(&self) -> Option<Severity> {
        None
    }

    /// Native numeric error code. Zero is treated as "no code".
    fn code(&self) -> Option<i64> {
        None
    }

    fn domain(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn localized_description(&self) -> String {
        self.to_string()
    }

    fn failure_reason(&self) -> Option<String> {
        None
    }

    fn recovery_suggestion(&self) -> Option<String> {
        None
    }

    fn recovery_options(&self) -> Option<Vec<String>> {
        None
    }

    /// Free-form key/value pairs carried by the native error.
    fn user_info(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Wraps an arbitrary error that exposes no reporting capabilities.
pub struct OpaqueError {
    inner: Box<dyn std::error::Error + Send + Sync>,
    domain: String,
}

impl OpaqueError {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(error),
            domain: std::any::type_name::<E>().to_string(),
        }
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.inner
    }
}

impl fmt::Debug for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueError")
            .field("domain", &self.domain)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for OpaqueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl Reportable for OpaqueError {
    fn domain(&self) -> String {
        self.domain.clone()
    }
}

impl From<anyhow::Error> for OpaqueError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            domain: "anyhow::Error".to_string(),
            inner: err.into(),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for OpaqueError {
    fn from(inner: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            inner,
            domain: "dyn std::error::Error".to_string(),
        }
    }
}
