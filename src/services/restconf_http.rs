//! RESTCONF client implementation using reqwest.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::domain::config::MdsalConfig;
use crate::domain::error::ResolutionError;
use crate::ports::{RestClientError, RestconfClient};

/// Blocking HTTP client for RESTCONF reads.
#[derive(Clone)]
pub struct RestconfHttpClient {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    max_retries: u32,
    retry_delay_ms: u64,
    client: Client,
}

impl std::fmt::Debug for RestconfHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestconfHttpClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RestconfHttpClient {
    /// Create a client from the `[mdsal]` configuration section.
    pub fn from_config(config: &MdsalConfig) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ResolutionError::config_error(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone().filter(|name| !name.trim().is_empty()),
            password: config.password.clone(),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            client,
        })
    }

    fn send_request(&self, url: &str) -> Result<String, RestClientError> {
        debug!(url, "restconf get");
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response =
            request.send().map_err(|e| RestClientError::Transport(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            response.text().map_err(|e| RestClientError::Transport(e.to_string()))
        } else {
            let details = response.text().unwrap_or_else(|_| "no response body".to_string());
            Err(RestClientError::Status { status: status.as_u16(), details })
        }
    }

    fn is_retryable(error: &RestClientError) -> bool {
        match error {
            RestClientError::Status { status, .. } => *status == 429 || *status >= 500,
            RestClientError::Transport(_) => true,
            RestClientError::NotConfigured(_) => false,
        }
    }
}

impl RestconfClient for RestconfHttpClient {
    fn get(&self, path: &str) -> Result<String, RestClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut last_error = None;
        let max_attempts = self.max_retries.max(1); // Ensure at least one attempt

        for attempt in 0..max_attempts {
            if attempt > 0 {
                // Exponential backoff: base * 2^(attempt-1)
                let delay = self.retry_delay_ms * 2_u64.pow(attempt.saturating_sub(1));
                std::thread::sleep(Duration::from_millis(delay));
                warn!(attempt = attempt + 1, max_attempts, url, "retrying restconf get");
            }

            match self.send_request(&url) {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if Self::is_retryable(&e) {
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RestClientError::Transport("request failed after all retries".into())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(server: &mockito::ServerGuard, max_retries: u32) -> MdsalConfig {
        MdsalConfig {
            base_url: server.url(),
            timeout_secs: 5,
            max_retries,
            retry_delay_ms: 1,
            username: None,
            password: None,
        }
    }

    #[test]
    fn returns_the_response_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/config/VNF-API:vnfs/vnf/vnf001")
            .with_status(200)
            .with_body(r#"{"vnf": {}}"#)
            .create();

        let client = RestconfHttpClient::from_config(&config_for(&server, 1)).unwrap();
        let body = client.get("config/VNF-API:vnfs/vnf/vnf001").unwrap();

        assert_eq!(body, r#"{"vnf": {}}"#);
        mock.assert();
    }

    #[test]
    fn sends_basic_auth_when_configured() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/secured")
            .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
            .with_status(200)
            .with_body("{}")
            .create();

        let mut config = config_for(&server, 1);
        config.username = Some("admin".to_string());
        config.password = Some("secret".to_string());
        let client = RestconfHttpClient::from_config(&config).unwrap();

        client.get("/secured").unwrap();
        mock.assert();
    }

    #[test]
    fn client_errors_are_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create();

        let client = RestconfHttpClient::from_config(&config_for(&server, 3)).unwrap();
        let err = client.get("missing").unwrap_err();

        assert!(matches!(err, RestClientError::Status { status: 404, .. }));
        mock.assert();
    }

    #[test]
    fn server_errors_retry_up_to_the_limit() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create();

        let client = RestconfHttpClient::from_config(&config_for(&server, 3)).unwrap();
        let err = client.get("flaky").unwrap_err();

        assert!(matches!(err, RestClientError::Status { status: 503, .. }));
        mock.assert();
    }

    #[test]
    fn retryability_follows_the_failure_kind() {
        assert!(RestconfHttpClient::is_retryable(&RestClientError::Status {
            status: 429,
            details: String::new(),
        }));
        assert!(RestconfHttpClient::is_retryable(&RestClientError::Status {
            status: 500,
            details: String::new(),
        }));
        assert!(!RestconfHttpClient::is_retryable(&RestClientError::Status {
            status: 404,
            details: String::new(),
        }));
        assert!(RestconfHttpClient::is_retryable(&RestClientError::Transport("timeout".into())));
        assert!(!RestconfHttpClient::is_retryable(&RestClientError::NotConfigured(
            "unset".into()
        )));
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let config = MdsalConfig {
            base_url: "http://localhost:8181/restconf".to_string(),
            timeout_secs: 5,
            max_retries: 1,
            retry_delay_ms: 1,
            username: Some("admin".to_string()),
            password: Some("secret".to_string()),
        };
        let client = RestconfHttpClient::from_config(&config).unwrap();
        let rendered = format!("{client:?}");

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret"));
    }
}
