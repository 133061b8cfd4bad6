//! Diagnostic trail entries leading up to an error.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// Default number of breadcrumbs kept per trail
pub const DEFAULT_CAPACITY: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbType {
    Navigation,
    Request,
    Process,
    Log,
    User,
    State,
    Error,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub meta_data: BTreeMap<String, String>,
    pub name: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: BreadcrumbType,
}

impl Breadcrumb {
    pub fn new(name: impl Into<String>, kind: BreadcrumbType) -> Self {
        Self::at(name, kind, Utc::now())
    }

    pub fn at(name: impl Into<String>, kind: BreadcrumbType, timestamp: DateTime<Utc>) -> Self {
        Self {
            meta_data: BTreeMap::new(),
            name: name.into(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
        }
    }

    pub fn with_meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.meta_data.insert(key.into(), value.into());
        self
    }
}

/// Bounded, shareable breadcrumb trail for a single request.
///
/// Clones share the same underlying buffer. When full, the oldest entry is
/// dropped.
#[derive(Debug, Clone)]
pub struct BreadcrumbTrail {
    inner: Arc<Mutex<TrailState>>,
}

#[derive(Debug)]
struct TrailState {
    crumbs: VecDeque<Breadcrumb>,
    capacity: usize,
    last_stamp: Option<DateTime<Utc>>,
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrailState {
                crumbs: VecDeque::with_capacity(capacity),
                capacity,
                last_stamp: None,
            })),
        }
    }

    /// Record a breadcrumb stamped now. Stamps never go backwards within a trail.
    pub fn leave(&self, name: impl Into<String>, kind: BreadcrumbType) {
        self.leave_with(name, kind, BTreeMap::new());
    }

    pub fn leave_with(
        &self,
        name: impl Into<String>,
        kind: BreadcrumbType,
        meta_data: BTreeMap<String, String>,
    ) {
        let mut state = self.inner.lock();
        if state.capacity == 0 {
            return;
        }

        let now = Utc::now();
        let stamp = match state.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        state.last_stamp = Some(stamp);

        let mut crumb = Breadcrumb::at(name, kind, stamp);
        crumb.meta_data = meta_data;

        if state.crumbs.len() == state.capacity {
            state.crumbs.pop_front();
        }
        state.crumbs.push_back(crumb);
    }

    /// Chronological copy of the current trail.
    pub fn snapshot(&self) -> Vec<Breadcrumb> {
        self.inner.lock().crumbs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BreadcrumbTrail {
    fn default() -> Self {
        Self::new()
    }
}
