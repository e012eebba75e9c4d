//! Configuration for the exporter.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Address to listen on (default: "0.0.0.0:9110").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Device API settings.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the outbound device API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Base URL of the Direkt cloud API (default: "https://iss.intinor.se").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for a single call to the device API, in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Overall time budget for one probe request, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_listen() -> String {
    "0.0.0.0:9110".to_string()
}

fn default_base_url() -> String {
    "https://iss.intinor.se".to_string()
}

fn default_call_timeout() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    10
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            call_timeout_secs: default_call_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "json" or "text".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format. JSON by default; text is meant for development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Basic-auth credentials for the device API, sourced from the
/// `DIREKT_USERNAME` and `DIREKT_PASSWORD` environment variables. The
/// device allows anonymous access, so authentication is only applied when
/// both values are set.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment; unset variables become empty.
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("DIREKT_USERNAME").unwrap_or_default(),
            password: std::env::var("DIREKT_PASSWORD").unwrap_or_default(),
        }
    }

    /// Whether both values are non-empty and authentication should be used.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.listen
            )));
        }

        if !self.device.base_url.starts_with("http://") && !self.device.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "Device base URL must be http(s): {}",
                self.device.base_url
            )));
        }

        if self.device.call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "call_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.device.probe_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "probe_timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            device: DeviceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse("{}").unwrap();

        assert_eq!(config.listen, "0.0.0.0:9110");
        assert_eq!(config.device.base_url, "https://iss.intinor.se");
        assert_eq!(config.device.call_timeout_secs, 15);
        assert_eq!(config.device.probe_timeout_secs, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            listen: "127.0.0.1:9111",
            device: {
                base_url: "https://direkt.example.com",
                call_timeout_secs: 5,
                probe_timeout_secs: 8
            },
            logging: {
                level: "debug",
                format: "text"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.listen, "127.0.0.1:9111");
        assert_eq!(config.device.base_url, "https://direkt.example.com");
        assert_eq!(config.device.call_timeout_secs, 5);
        assert_eq!(config.device.probe_timeout_secs, 8);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_validate_invalid_listen() {
        let result = ExporterConfig::parse(r#"{ listen: "not-an-address" }"#);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let result = ExporterConfig::parse(r#"{ device: { base_url: "iss.intinor.se" } }"#);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must be http(s)"));
    }

    #[test]
    fn test_validate_zero_call_timeout() {
        let result = ExporterConfig::parse(r#"{ device: { call_timeout_secs: 0 } }"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_configured_only_when_both_set() {
        let both = Credentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        };
        let missing_password = Credentials {
            username: "user".to_string(),
            password: String::new(),
        };

        assert!(both.is_configured());
        assert!(!missing_password.is_configured());
        assert!(!Credentials::default().is_configured());
    }
}
