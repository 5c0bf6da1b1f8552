//! Application configuration settings
//!
//! Timeouts and logging options, loaded from the environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Timeout configuration, all values in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Control-plane request timeout
    pub control_plane: u64,
    /// Streaming connection establishment timeout
    pub connect: u64,
    /// Longest wait for the next inbound frame
    pub stream_idle: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            control_plane: 30,
            connect: 10,
            stream_idle: 60,
        }
    }
}

impl TimeoutConfig {
    /// Load timeouts from the environment
    ///
    /// Reads only the `ENDPOINT_*_TIMEOUT` variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load timeouts from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeouts = Self {
            control_plane: get("ENDPOINT_CONTROL_TIMEOUT", "30")
                .parse()
                .context("Invalid control plane timeout")?,
            connect: get("ENDPOINT_CONNECT_TIMEOUT", "10")
                .parse()
                .context("Invalid connect timeout")?,
            stream_idle: get("ENDPOINT_STREAM_IDLE_TIMEOUT", "60")
                .parse()
                .context("Invalid stream idle timeout")?,
        };

        if timeouts.control_plane == 0 || timeouts.connect == 0 || timeouts.stream_idle == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        Ok(timeouts)
    }

    pub fn control_plane(&self) -> Duration {
        Duration::from_secs(self.control_plane)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }

    pub fn stream_idle(&self) -> Duration {
        Duration::from_secs(self.stream_idle)
    }
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let settings = Self {
            timeouts: TimeoutConfig::from_lookup(&lookup)?,
            logging: LoggingConfig {
                level: get("RUST_LOG", "info"),
                format: get("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        // Any filter directive the subscriber accepts, e.g. `warn,evalshim=debug`
        EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("Invalid log level: {}", self.logging.level))?;

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeouts.stream_idle(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Settings::from_lookup(lookup(&[("ENDPOINT_STREAM_IDLE_TIMEOUT", "0")]));
        assert!(result.unwrap_err().to_string().contains("cannot be 0"));
    }

    #[test]
    fn test_filter_directives_accepted() {
        for level in ["INFO", "evalshim=debug", "warn,evalshim=trace"] {
            let settings = Settings::from_lookup(lookup(&[("RUST_LOG", level)])).unwrap();
            assert_eq!(settings.logging.level, level);
        }

        let result = Settings::from_lookup(lookup(&[("RUST_LOG", "evalshim=loud")]));
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_timeouts_ignore_logging_variables() {
        let timeouts = TimeoutConfig::from_lookup(lookup(&[
            ("RUST_LOG", "evalshim=loud"),
            ("LOG_FORMAT", "xml"),
            ("ENDPOINT_CONNECT_TIMEOUT", "3"),
        ]))
        .unwrap();
        assert_eq!(timeouts.connect(), Duration::from_secs(3));
        assert_eq!(timeouts.control_plane, 30);
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let result = Settings::from_lookup(lookup(&[("LOG_FORMAT", "xml")]));
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }
}
