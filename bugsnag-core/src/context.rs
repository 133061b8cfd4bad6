use crate::breadcrumbs::Breadcrumb;
use crate::metadata::Metadata;
use crate::payload::StackFrame;
use crate::severity::Severity;

/// Per-report inputs supplied by the caller
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub breadcrumbs: Vec<Breadcrumb>,
    pub metadata: Metadata,
    pub user_id: Option<String>,
    pub frame: StackFrame,
    pub severity: Option<Severity>,
}

impl ReportContext {
    /// Start a context whose single frame is the caller's location.
    #[track_caller]
    pub fn new(method: impl Into<String>) -> Self {
        Self::with_frame(StackFrame::here(method))
    }

    pub fn with_frame(frame: StackFrame) -> Self {
        Self {
            breadcrumbs: Vec::new(),
            metadata: Metadata::new(),
            user_id: None,
            frame,
            severity: None,
        }
    }

    pub fn with_breadcrumbs(mut self, breadcrumbs: Vec<Breadcrumb>) -> Self {
        self.breadcrumbs = breadcrumbs;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn add_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key, value);
        self
    }
}
