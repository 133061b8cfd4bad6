//! Turns an error plus request context into a report payload.
//!
//! Construction never fails: anything that cannot be extracted is left out of
//! the payload instead of aborting the report.

use crate::body_filter::BodyFilter;
use crate::config::BugsnagConfig;
use crate::context::ReportContext;
use crate::metadata::Metadata;
use crate::payload::{App, Event, ExceptionRecord, Notifier, Payload, RequestInfo, User};
use crate::policy::severity_of;
use crate::reportable::Reportable;
use crate::request::RequestSnapshot;
use http::StatusCode;

/// Message used when the error carries no debug reason
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    api_key: String,
    app: App,
    body_filter: BodyFilter,
    payload_version: String,
    notifier: Notifier,
}

impl PayloadBuilder {
    pub fn new(config: &BugsnagConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            app: App {
                release_stage: config.release_stage.clone(),
                version: config.app_version.clone(),
            },
            body_filter: BodyFilter::new(config.key_filters.iter().cloned()),
            payload_version: config.payload_version.clone(),
            notifier: Notifier::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Build a single-event payload for `error`.
    pub fn build(
        &self,
        error: &dyn Reportable,
        request: Option<&RequestSnapshot>,
        context: ReportContext,
    ) -> Payload {
        let severity = context.severity.unwrap_or_else(|| severity_of(error));
        let meta_data = Metadata::for_error(error, &context.metadata);

        let event = Event {
            app: self.app.clone(),
            breadcrumbs: context.breadcrumbs,
            exceptions: vec![exception_record(error, context.frame)],
            meta_data,
            payload_version: self.payload_version.clone(),
            request: request.map(|snapshot| self.request_info(snapshot)),
            severity,
            unhandled: true,
            user: context.user_id.map(|id| User { id }),
        };

        Payload {
            api_key: self.api_key.clone(),
            events: vec![event],
            notifier: self.notifier.clone(),
        }
    }

    fn request_info(&self, snapshot: &RequestSnapshot) -> RequestInfo {
        RequestInfo {
            body: snapshot
                .body
                .as_deref()
                .and_then(|raw| self.body_filter.apply(raw)),
            client_ip: snapshot.peer.host.clone(),
            headers: snapshot.headers.clone(),
            http_method: snapshot.method.clone(),
            referer: snapshot.peer.description.clone(),
            url: snapshot.url.clone(),
        }
    }
}

fn exception_record(error: &dyn Reportable, frame: crate::payload::StackFrame) -> ExceptionRecord {
    ExceptionRecord {
        error_class: error.localized_description(),
        message: error.reason().unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        stacktrace: vec![frame],
        kind: type_label(error),
    }
}

/// Reason phrase of the error's status, defaulting to 500's.
pub fn type_label(error: &dyn Reportable) -> String {
    let status = error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    status
        .canonical_reason()
        .unwrap_or("Internal Server Error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::StackFrame;
    use crate::reportable::OpaqueError;

    fn builder() -> PayloadBuilder {
        PayloadBuilder::new(
            &BugsnagConfig::new("api-key")
                .with_release_stage("staging")
                .with_app_version("1.2.3")
                .with_key_filters(["password"]),
        )
    }

    fn context() -> ReportContext {
        ReportContext::with_frame(StackFrame::new("src/handlers.rs", "create_order", 12, 9))
    }

    #[test]
    fn test_single_event_single_exception() {
        let error = OpaqueError::from(anyhow::anyhow!("boom"));
        let payload = builder().build(&error, None, context());

        assert_eq!(payload.api_key, "api-key");
        assert_eq!(payload.events.len(), 1);
        let event = &payload.events[0];
        assert_eq!(event.exceptions.len(), 1);
        assert_eq!(event.exceptions[0].stacktrace.len(), 1);
        assert!(event.unhandled);
        assert!(event.request.is_none());
        assert!(event.user.is_none());
        assert_eq!(event.app.release_stage, "staging");
        assert_eq!(event.app.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_request_body_filtered() {
        let error = OpaqueError::from(anyhow::anyhow!("boom"));
        let snapshot = RequestSnapshot::new("POST", "https://shop.example/orders")
            .with_peer(Some("10.0.0.7".to_string()), "10.0.0.7:53211")
            .with_body(r#"{"password":"pw","sku":"A-1"}"#);

        let payload = builder().build(&error, Some(&snapshot), context());
        let request = payload.events[0].request.as_ref().unwrap();

        let body = request.body.as_deref().unwrap();
        assert!(!body.contains("password"));
        assert!(body.contains("A-1"));
        assert_eq!(request.client_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(request.referer, "10.0.0.7:53211");
        assert_eq!(request.http_method, "POST");
    }

    #[test]
    fn test_caller_severity_and_user() {
        let error = OpaqueError::from(anyhow::anyhow!("boom"));
        let ctx = context()
            .with_severity(crate::severity::Severity::Info)
            .with_user_id("user-9")
            .add_metadata("tenant", "acme");

        let payload = builder().build(&error, None, ctx);
        let event = &payload.events[0];
        assert_eq!(event.severity, crate::severity::Severity::Info);
        assert_eq!(event.user.as_ref().map(|u| u.id.as_str()), Some("user-9"));
        assert_eq!(event.meta_data.get("tenant"), Some("acme"));
    }
}
