//! Configuration for the reporting pipeline

use crate::error::{BugsnagError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://notify.bugsnag.com";
pub const DEFAULT_PAYLOAD_VERSION: &str = "4";
pub const ENV_PREFIX: &str = "BUGSNAG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BugsnagConfig {
    /// Project API key
    pub api_key: String,

    /// Release stage label sent with every event
    pub release_stage: String,

    /// Application version
    pub app_version: Option<String>,

    /// Notification endpoint
    pub endpoint: String,

    /// Top-level request body fields to redact
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub key_filters: Vec<String>,

    /// Release stages allowed to notify. Empty means all.
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub notify_release_stages: Vec<String>,

    /// Payload schema version
    pub payload_version: String,

    /// Upper bound for a single submission
    pub timeout_secs: u64,
}

impl Default for BugsnagConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            release_stage: "production".to_string(),
            app_version: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            key_filters: Vec::new(),
            notify_release_stages: Vec::new(),
            payload_version: DEFAULT_PAYLOAD_VERSION.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Lists come from files as arrays and from the environment as "a,b,c".
fn list_or_comma_separated<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrJoined {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match ListOrJoined::deserialize(deserializer)? {
        ListOrJoined::List(items) => items,
        ListOrJoined::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

impl BugsnagConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load from an optional file, then `BUGSNAG_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`BugsnagError::Config`] when a source cannot be read or the
    /// resulting configuration fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// `env` replaces the process environment when given.
    fn load_with_env(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        // Values stay strings so keys and versions like "00123" or "2.10" survive
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).source(env));

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(
            endpoint = %loaded.endpoint,
            release_stage = %loaded.release_stage,
            filters = loaded.key_filters.len(),
            "Bugsnag configuration loaded"
        );
        Ok(loaded)
    }

    /// Load configuration from environment variables only
    ///
    /// # Errors
    ///
    /// See [`BugsnagConfig::load`].
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// # Errors
    ///
    /// Returns [`BugsnagError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(BugsnagError::Config("api_key must not be empty".to_string()));
        }

        let endpoint = url::Url::parse(&self.endpoint)
            .map_err(|e| BugsnagError::Config(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(BugsnagError::Config(format!(
                "endpoint must be http or https, got {}",
                endpoint.scheme()
            )));
        }

        if self.timeout_secs == 0 {
            return Err(BugsnagError::Config("timeout_secs must be greater than zero".to_string()));
        }

        if self.payload_version.trim().is_empty() {
            return Err(BugsnagError::Config("payload_version must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_release_stage(mut self, stage: impl Into<String>) -> Self {
        self.release_stage = stage.into();
        self
    }

    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_key_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notify_release_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notify_release_stages = stages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
