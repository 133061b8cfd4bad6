use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use bugsnag_core::{BreadcrumbTrail, BreadcrumbType, ReportContext, Reportable, RequestSnapshot};
use bugsnag_notifier::Reporter;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// Bodies above this size are not captured unless configured otherwise
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Middleware state: the shared reporter plus capture limits.
#[derive(Clone)]
pub struct ReportState {
    pub reporter: Reporter,
    pub max_body_bytes: usize,
}

impl ReportState {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

/// Error attached to a response for the reporting middleware to pick up.
#[derive(Clone)]
pub struct AttachedError(pub Arc<dyn Reportable>);

impl AttachedError {
    pub fn new<E: Reportable + 'static>(error: E) -> Self {
        Self(Arc::new(error))
    }
}

impl fmt::Debug for AttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttachedError").field(&self.0.to_string()).finish()
    }
}

/// Identifier of the authenticated user, read from request or response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUser(pub String);

/// 5xx response produced without an attached error
#[derive(Debug)]
pub struct UnhandledStatus(pub StatusCode);

impl fmt::Display for UnhandledStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unhandled {} response", self.0)
    }
}

impl std::error::Error for UnhandledStatus {}

impl Reportable for UnhandledStatus {
    fn status(&self) -> Option<StatusCode> {
        Some(self.0)
    }
}

/// Error reporting middleware
///
/// Use with `axum::middleware::from_fn_with_state`. The response is passed
/// through unchanged; reporting happens in the background.
pub async fn report_errors(State(state): State<ReportState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let length = body
        .size_hint()
        .exact()
        .and_then(|len| usize::try_from(len).ok())
        .or_else(|| declared_length(&parts.headers));

    let (captured, body) = if length.is_some_and(|len| len <= state.max_body_bytes) {
        match axum::body::to_bytes(body, state.max_body_bytes).await {
            Ok(bytes) => (Some(bytes.clone()), Body::from(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, uri = %parts.uri, "Failed to read request body");
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::BAD_REQUEST;
                return response;
            }
        }
    } else {
        // Unknown or oversized bodies stream through uncaptured
        (None, body)
    };

    let snapshot = snapshot(&parts, captured.as_deref());
    let trail = install_trail(&mut parts);
    let request_user = parts.extensions.get::<ReportUser>().cloned();

    let response = next.run(Request::from_parts(parts, body)).await;
    finish(&state, snapshot, trail, request_user, response)
}

fn install_trail(parts: &mut Parts) -> BreadcrumbTrail {
    let trail = BreadcrumbTrail::new();
    trail.leave(format!("{} {}", parts.method, parts.uri.path()), BreadcrumbType::Request);
    parts.extensions.insert(trail.clone());
    trail
}

#[track_caller]
fn finish(
    state: &ReportState,
    snapshot: RequestSnapshot,
    trail: BreadcrumbTrail,
    request_user: Option<ReportUser>,
    mut response: Response,
) -> Response {
    let status = response.status();
    let error: Arc<dyn Reportable> = match response.extensions_mut().remove::<AttachedError>() {
        Some(AttachedError(error)) => error,
        None if status.is_server_error() => Arc::new(UnhandledStatus(status)),
        None => return response,
    };

    let user = response
        .extensions()
        .get::<ReportUser>()
        .cloned()
        .or(request_user);

    let mut context = ReportContext::new(format!("{} {}", snapshot.method, snapshot.url))
        .with_breadcrumbs(trail.snapshot())
        .add_metadata("Response status", status.as_u16().to_string());
    if let Some(ReportUser(id)) = user {
        context = context.with_user_id(id);
    }

    let _receipt = state.reporter.report(error.as_ref(), Some(&snapshot), context);
    response
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Capture the request as seen on entry to the middleware. `body` is `None`
/// when it was not buffered.
pub fn snapshot(parts: &Parts, body: Option<&[u8]>) -> RequestSnapshot {
    let connect = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let host = forwarded_client(&parts.headers).or_else(|| connect.map(|addr| addr.ip().to_string()));
    let description = connect
        .map(|addr| addr.to_string())
        .or_else(|| host.clone())
        .unwrap_or_default();

    let headers = parts.headers.iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|value| (name.as_str().to_string(), value.to_string()))
    });

    let snapshot = RequestSnapshot::new(parts.method.as_str(), absolute_url(parts))
        .with_peer(host, description)
        .with_headers(headers);
    match body {
        Some(body) => snapshot.with_body(body),
        None => snapshot,
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|first| first.trim().to_string())
        .filter(|first| !first.is_empty())
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
        })
}

fn absolute_url(parts: &Parts) -> String {
    if parts.uri.scheme().is_some() {
        return parts.uri.to_string();
    }

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let scheme = parts
        .headers
        .get("X-Forwarded-Proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");

    match host {
        Some(host) => format!("{}://{}{}", scheme, host, parts.uri),
        None => parts.uri.to_string(),
    }
}
