//! Wire model for the error reporting endpoint.
//!
//! Field names follow the remote service's camelCase schema. Optional fields
//! are omitted rather than serialized as `null`.

use crate::breadcrumbs::Breadcrumb;
use crate::metadata::Metadata;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::Location;

/// Top-level report body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub api_key: String,
    pub events: Vec<Event>,
    pub notifier: Notifier,
}

impl Payload {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Identity of this bridge as a notifier library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    pub name: String,
    pub url: String,
    pub version: String,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            name: "Bugsnag Rust Bridge".to_string(),
            url: "https://docs.bugsnag.com/api/error-reporting/".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub release_stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub app: App,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub exceptions: Vec<ExceptionRecord>,
    pub meta_data: Metadata,
    pub payload_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
    pub severity: Severity,
    pub unhandled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionRecord {
    pub error_class: String,
    pub message: String,
    pub stacktrace: Vec<StackFrame>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub file: String,
    pub method: String,
    pub line_number: u32,
    pub column_number: u32,
    pub code: Vec<String>,
    pub in_project: bool,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, method: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            method: method.into(),
            line_number: line,
            column_number: column,
            code: Vec::new(),
            in_project: true,
        }
    }

    /// Capture the caller's source location as the single frame of a report.
    #[track_caller]
    pub fn here(method: impl Into<String>) -> Self {
        Self::from_location(Location::caller(), method)
    }

    pub fn from_location(location: &Location<'_>, method: impl Into<String>) -> Self {
        Self::new(location.file(), method, location.line(), location.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub http_method: String,
    pub referer: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}
