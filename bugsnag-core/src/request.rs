use std::collections::BTreeMap;

/// Where the failed request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerInfo {
    /// Client host or address, when known
    pub host: Option<String>,
    /// Human readable peer descriptor
    pub description: String,
}

/// Immutable capture of the HTTP request that triggered an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    pub peer: PeerInfo,
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes; `None` when the body was not captured
    pub body: Option<Vec<u8>>,
}

impl RequestSnapshot {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_peer(mut self, host: Option<String>, description: impl Into<String>) -> Self {
        self.peer = PeerInfo {
            host,
            description: description.into(),
        };
        self
    }

    /// Add headers in order; a repeated name keeps the last value.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}
