//! Runtime configuration
//!
//! Connection settings for the persistence API and the execution
//! engine, loadable from environment variables.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RuntimeError, RuntimeResult};

/// Configuration for the runtime collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the workflow persistence API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the execution engine
    #[serde(default = "default_execution_url")]
    pub execution_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_execution_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            execution_url: default_execution_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn load() -> RuntimeResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FLOWFORGE_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("FLOWFORGE_EXECUTION_URL") {
            config.execution_url = url;
        }
        if let Ok(timeout) = std::env::var("FLOWFORGE_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout.parse().map_err(|_| {
                RuntimeError::ConfigurationError(format!(
                    "Invalid FLOWFORGE_HTTP_TIMEOUT_SECS: {}",
                    timeout
                ))
            })?;
        }

        config.validate()?;
        info!(
            api_url = %config.api_url,
            execution_url = %config.execution_url,
            "Loaded runtime configuration"
        );
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> RuntimeResult<()> {
        if self.api_url.is_empty() {
            return Err(RuntimeError::ConfigurationError(
                "api_url must not be empty".to_string(),
            ));
        }
        if self.execution_url.is_empty() {
            return Err(RuntimeError::ConfigurationError(
                "execution_url must not be empty".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(RuntimeError::ConfigurationError(
                "http_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_empty_api_url_rejected() {
        let config = RuntimeConfig {
            api_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RuntimeError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = RuntimeConfig {
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
