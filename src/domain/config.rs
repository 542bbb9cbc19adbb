//! Engine configuration (`config.toml`) model and parser.

use serde::Deserialize;
use url::Url;

use crate::domain::error::ResolutionError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub mdsal: MdsalConfig,
}

/// RESTCONF endpoint settings for the bundled HTTP adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MdsalConfig {
    /// Base URL the dictionary `url-path` values are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Optional basic-auth credentials.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8181/restconf".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for MdsalConfig {
    fn default() -> Self {
        MdsalConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            username: None,
            password: None,
        }
    }
}

impl EngineConfig {
    /// Validate field values beyond what serde enforces.
    pub fn validate(&self) -> Result<(), ResolutionError> {
        let url = Url::parse(&self.mdsal.base_url).map_err(|e| {
            ResolutionError::config_error(format!(
                "Invalid mdsal.base-url '{}': {e}",
                self.mdsal.base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ResolutionError::config_error(format!(
                "Invalid mdsal.base-url '{}': scheme must be http or https",
                self.mdsal.base_url
            )));
        }
        if self.mdsal.timeout_secs == 0 {
            return Err(ResolutionError::config_error("mdsal.timeout-secs must be positive"));
        }
        Ok(())
    }
}

/// Parse and validate engine configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<EngineConfig, ResolutionError> {
    let config: EngineConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
