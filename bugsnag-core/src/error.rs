use thiserror::Error;

/// Errors raised inside the reporting pipeline itself.
///
/// None of these ever reach the HTTP response of the request being reported;
/// they are logged and folded into a failed submission outcome.
#[derive(Error, Debug)]
pub enum BugsnagError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failed before a response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Remote service answered with a non-success status
    #[error("Unexpected response status: {0}")]
    Status(u16),

    /// Submission exceeded the configured deadline
    #[error("Submission timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// No async runtime was available to run the submission
    #[error("No async runtime available for submission")]
    NoRuntime,

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for BugsnagError {
    fn from(err: config::ConfigError) -> Self {
        BugsnagError::Config(err.to_string())
    }
}

/// Result type alias for reporting pipeline operations
pub type Result<T> = std::result::Result<T, BugsnagError>;
