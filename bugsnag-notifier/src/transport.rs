//! Outbound HTTP seam.
//!
//! The connection manager only needs "POST these bytes to this URL and tell
//! me the status"; everything else about the client library stays behind
//! this trait.

use async_trait::async_trait;
use bugsnag_core::{BugsnagError, Result};
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` to `url` and return the response status code.
    ///
    /// # Errors
    ///
    /// Returns [`BugsnagError::Network`] when no response was received.
    async fn post(&self, url: &str, headers: Vec<(String, String)>, body: Vec<u8>) -> Result<u16>;
}

/// reqwest-backed transport shared by every submission
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`BugsnagError::Config`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bugsnag-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BugsnagError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, headers: Vec<(String, String)>, body: Vec<u8>) -> Result<u16> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BugsnagError::Network(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}
