//! Report / suppress decision and severity resolution.
//!
//! Pure functions over the error value and the immutable configuration.

use crate::config::BugsnagConfig;
use crate::reportable::Reportable;
use crate::severity::Severity;

#[derive(Debug, Clone, Default)]
pub struct ReportPolicy {
    release_stage: String,
    notify_release_stages: Vec<String>,
}

impl ReportPolicy {
    pub fn new(release_stage: impl Into<String>, notify_release_stages: Vec<String>) -> Self {
        Self {
            release_stage: release_stage.into(),
            notify_release_stages,
        }
    }

    pub fn from_config(config: &BugsnagConfig) -> Self {
        Self::new(config.release_stage.clone(), config.notify_release_stages.clone())
    }

    /// An explicit override always wins. Otherwise the error is reported
    /// unless the release stage is excluded from notification.
    pub fn should_report(&self, error: &dyn Reportable) -> bool {
        if let Some(decision) = error.should_report() {
            return decision;
        }
        self.release_stage_enabled()
    }

    pub fn severity_of(&self, error: &dyn Reportable) -> Severity {
        severity_of(error)
    }

    fn release_stage_enabled(&self) -> bool {
        self.notify_release_stages.is_empty()
            || self
                .notify_release_stages
                .iter()
                .any(|stage| stage == &self.release_stage)
    }
}

/// Explicit severity, then status class, then `error`.
pub fn severity_of(error: &dyn Reportable) -> Severity {
    error
        .severity()
        .or_else(|| error.status().map(Severity::from_status))
        .unwrap_or(Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reportable::OpaqueError;
    use http::StatusCode;
    use std::fmt;

    #[derive(Debug, Default)]
    struct Flagged {
        status: Option<StatusCode>,
        report: Option<bool>,
        severity: Option<Severity>,
    }

    impl fmt::Display for Flagged {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("flagged")
        }
    }

    impl std::error::Error for Flagged {}

    impl Reportable for Flagged {
        fn status(&self) -> Option<StatusCode> {
            self.status
        }

        fn should_report(&self) -> Option<bool> {
            self.report
        }

        fn severity(&self) -> Option<Severity> {
            self.severity
        }
    }

    fn opaque() -> OpaqueError {
        OpaqueError::from(anyhow::anyhow!("opaque"))
    }

    #[test]
    fn test_opaque_error_defaults() {
        let policy = ReportPolicy::default();
        assert!(policy.should_report(&opaque()));
        assert_eq!(policy.severity_of(&opaque()), Severity::Error);
    }

    #[test]
    fn test_status_drives_severity() {
        let bad_request = Flagged { status: Some(StatusCode::BAD_REQUEST), ..Default::default() };
        let unavailable = Flagged { status: Some(StatusCode::SERVICE_UNAVAILABLE), ..Default::default() };
        let accepted = Flagged { status: Some(StatusCode::ACCEPTED), ..Default::default() };

        assert_eq!(severity_of(&bad_request), Severity::Warning);
        assert_eq!(severity_of(&unavailable), Severity::Error);
        assert_eq!(severity_of(&accepted), Severity::Info);
        assert!(ReportPolicy::default().should_report(&bad_request));
    }

    #[test]
    fn test_explicit_severity_beats_status() {
        let err = Flagged {
            status: Some(StatusCode::BAD_REQUEST),
            severity: Some(Severity::Info),
            ..Default::default()
        };
        assert_eq!(severity_of(&err), Severity::Info);
    }

    #[test]
    fn test_override_suppresses_fatal_error() {
        let err = Flagged {
            status: Some(StatusCode::INTERNAL_SERVER_ERROR),
            report: Some(false),
            ..Default::default()
        };
        assert!(!ReportPolicy::default().should_report(&err));
    }

    #[test]
    fn test_release_stage_gate() {
        let policy = ReportPolicy::new("development", vec!["production".to_string()]);
        assert!(!policy.should_report(&opaque()));

        let forced = Flagged { report: Some(true), ..Default::default() };
        assert!(policy.should_report(&forced));

        let production = ReportPolicy::new("production", vec!["production".to_string()]);
        assert!(production.should_report(&opaque()));
    }
}
