//! RESTCONF client port definition.

use thiserror::Error;

/// Failure modes of the RESTCONF port.
#[derive(Debug, Error)]
pub enum RestClientError {
    /// No endpoint is wired into the engine.
    #[error("RESTCONF client is not configured: {0}")]
    NotConfigured(String),

    /// The request never produced an HTTP response.
    #[error("RESTCONF request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("RESTCONF endpoint returned status {status}: {details}")]
    Status { status: u16, details: String },
}

impl RestClientError {
    /// Transport and status failures mean "no value at that path" to the
    /// resolver; configuration failures abort the assignment instead.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, RestClientError::Transport(_) | RestClientError::Status { .. })
    }
}

/// Port for RESTCONF-style HTTP reads.
pub trait RestconfClient {
    /// GET `path` (relative to the adapter's base URL) and return the
    /// raw response body.
    fn get(&self, path: &str) -> Result<String, RestClientError>;
}

/// Placeholder client used when no endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredRestconfClient;

impl RestconfClient for UnconfiguredRestconfClient {
    fn get(&self, _path: &str) -> Result<String, RestClientError> {
        Err(RestClientError::NotConfigured(
            "no RESTCONF endpoint wired; set [mdsal] in config.toml or provide a RestconfClient".into(),
        ))
    }
}
