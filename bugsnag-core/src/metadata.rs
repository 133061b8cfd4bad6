// Flattened string metadata attached to every event.
// Keys with no value are never stored.

use crate::reportable::Reportable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys for the fields extracted from the native error
pub mod keys {
    pub const ERROR_CODE: &str = "Error code";
    pub const ERROR_DOMAIN: &str = "Error domain";
    pub const LOCALIZED_DESCRIPTION: &str = "Error localized description";
    pub const FAILURE_REASON: &str = "Error localized failure reason";
    pub const RECOVERY_OPTIONS: &str = "Error localized recovery options";
    pub const RECOVERY_SUGGESTION: &str = "Error localized recovery suggestion";
}

/// Flat string to string map with later-wins merge semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt<K: Into<String>, V: Into<String>>(&mut self, key: K, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge `other` into `self`; values from `other` win on collision.
    pub fn merge<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.0.extend(other);
    }

    /// Flatten a JSON object. Strings are kept verbatim, `null`s are dropped,
    /// everything else is rendered as compact JSON.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let flattened = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) => Some((key, text)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Self(flattened)
    }

    /// Fields extracted from the native error's capability set.
    pub fn from_native(error: &dyn Reportable) -> Self {
        let mut meta = Self::new();
        meta.insert_opt(
            keys::ERROR_CODE,
            error.code().filter(|code| *code != 0).map(|code| code.to_string()),
        );
        meta.insert(keys::ERROR_DOMAIN, error.domain());
        meta.insert(keys::LOCALIZED_DESCRIPTION, error.localized_description());
        meta.insert_opt(keys::FAILURE_REASON, error.failure_reason());
        meta.insert_opt(
            keys::RECOVERY_OPTIONS,
            error.recovery_options().map(|options| options.join(",")),
        );
        meta.insert_opt(keys::RECOVERY_SUGGESTION, error.recovery_suggestion());
        meta
    }

    /// Native fields, then the error's user info, then its structured
    /// metadata, then caller-supplied metadata.
    pub fn for_error(error: &dyn Reportable, extra: &Metadata) -> Self {
        let mut meta = Self::from_native(error);
        meta.merge(error.user_info());
        if let Some(structured) = error.metadata() {
            meta.merge(Self::from_json_object(structured));
        }
        meta.merge(extra.clone());
        meta
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl IntoIterator for Metadata {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, String)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
