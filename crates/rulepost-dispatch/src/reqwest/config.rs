//! Reqwest transport configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of redirects the shared client follows.
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

/// Configuration for the reqwest HTTP transport.
///
/// The timeout and redirect limit are client-wide defaults; every dispatched
/// request carries its own values, which take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// Redirects the shared client follows
    #[cfg_attr(
        feature = "config",
        arg(
            id = "http_max_redirects",
            long = "http-max-redirects",
            env = "HTTP_MAX_REDIRECTS",
            default_value = "3"
        )
    )]
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            http_timeout: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

impl ReqwestConfig {
    /// Create a new configuration with the specified timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            http_timeout: timeout_secs,
            ..Default::default()
        }
    }

    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("rulepost/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the redirect limit of the shared client.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout == 0 {
            return Err(Error::Config("timeout cannot be zero".into()));
        }
        if self.user_agent.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Config("user_agent cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReqwestConfig::default();
        assert_eq!(config.http_timeout, 30);
        assert_eq!(config.max_redirects, 3);
        assert!(config.user_agent.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReqwestConfig::new(60)
            .with_max_redirects(0)
            .with_user_agent("custom-agent/1.0");

        assert_eq!(config.http_timeout, 60);
        assert_eq!(config.max_redirects, 0);
        assert_eq!(config.effective_user_agent(), "custom-agent/1.0");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        assert!(ReqwestConfig::new(0).validate().is_err());
        assert!(
            ReqwestConfig::default()
                .with_user_agent("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_effective_user_agent_uses_default_when_none() {
        let config = ReqwestConfig::default();
        assert!(config.effective_user_agent().starts_with("rulepost/"));
    }
}
