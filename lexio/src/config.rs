//! Configuration for the client and the polling loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ValidationError;

/// Configuration for the Lexio HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds. Bounds a single HTTP exchange, not a
    /// whole polling wait.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Default polling behaviour for `wait`-style operations.
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_base_url() -> String {
    "https://api.lexio.dev/v1".to_string()
}

fn default_timeout() -> f64 {
    60.0
}

fn default_user_agent() -> String {
    "lexio-rust/0.1".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            poll: PollConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new client configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the default polling configuration.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Gets the per-request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    /// Validates the timeout and the embedded polling configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.timeout_seconds > 0.0) {
            return Err(ValidationError::new("timeout must be greater than zero")
                .with_field("timeout_seconds"));
        }
        self.poll.validate()
    }
}

/// Configuration for the job polling loop.
///
/// The interval is fixed between fetches. There is no backoff: workload
/// duration is server-controlled and unpredictable, so a steady cadence is
/// both simpler and no worse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between status fetches.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    /// Maximum total wall-clock seconds to wait for a terminal state.
    #[serde(default = "default_max_wait")]
    pub max_wait_seconds: f64,
}

fn default_poll_interval() -> f64 {
    5.0
}

fn default_max_wait() -> f64 {
    3600.0
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            max_wait_seconds: default_max_wait(),
        }
    }
}

impl PollConfig {
    /// Creates a new polling configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interval between polls.
    #[must_use]
    pub fn with_poll_interval(mut self, seconds: f64) -> Self {
        self.poll_interval_seconds = seconds;
        self
    }

    /// Sets the maximum total wait.
    #[must_use]
    pub fn with_max_wait(mut self, seconds: f64) -> Self {
        self.max_wait_seconds = seconds;
        self
    }

    /// Gets the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds)
    }

    /// Gets the maximum wait as a Duration.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs_f64(self.max_wait_seconds)
    }

    /// Validates that both durations are strictly positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.poll_interval_seconds > 0.0) {
            return Err(ValidationError::new("poll_interval must be greater than zero")
                .with_field("poll_interval_seconds"));
        }
        if !(self.max_wait_seconds > 0.0) {
            return Err(ValidationError::new("max_wait_time must be greater than zero")
                .with_field("max_wait_seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.lexio.dev/v1");
        assert_eq!(config.timeout_seconds, 60.0);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_base_url("https://staging.lexio.dev/v1")
            .with_timeout(15.0);

        assert_eq!(config.base_url, "https://staging.lexio.dev/v1");
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_client_config_rejects_non_positive_timeout() {
        let err = ClientConfig::new().with_timeout(-1.0).validate().unwrap_err();
        assert_eq!(err.field, Some("timeout_seconds".to_string()));
        assert!(ClientConfig::new().with_timeout(0.0).validate().is_err());
        assert!(ClientConfig::new().with_timeout(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_client_config_validate_covers_poll_config() {
        let config = ClientConfig::new().with_poll(PollConfig::new().with_max_wait(0.0));
        assert!(config.validate().is_err());
        assert!(ClientConfig::new().validate().is_ok());
    }

    #[test]
    fn test_poll_config_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.max_wait(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_config_builder() {
        let config = PollConfig::new().with_poll_interval(1.0).with_max_wait(10.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.max_wait(), Duration::from_secs(10));
    }

    #[test]
    fn test_poll_config_rejects_zero_interval() {
        let config = PollConfig::new().with_poll_interval(0.0);
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, Some("poll_interval_seconds".to_string()));
    }

    #[test]
    fn test_poll_config_rejects_negative_max_wait() {
        let config = PollConfig::new().with_max_wait(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_config_rejects_nan() {
        let config = PollConfig::new().with_poll_interval(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, "https://api.lexio.dev/v1");
        assert_eq!(config.poll.poll_interval_seconds, 5.0);
    }
}
