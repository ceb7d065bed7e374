//! API configuration.
//!
//! Loaded from a TOML file, then overridden from the environment.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "tp_model"
//!
//! [api]
//! address = "localhost:8080"
//! timeout_ms = 5000
//!
//! [cell]
//! rotation_time_ms = 200
//! ```
//!
//! # Environment
//!
//! | Variable      | Field            | Format                       |
//! |---------------|------------------|------------------------------|
//! | `LOG_LEVEL`   | `shared.log_level` | `debug`, `INFO`, ...       |
//! | `API_ADDRESS` | `api.address`    | `host:port`                  |
//! | `API_TIMEOUT` | `api.timeout_ms` | `5s`, `250ms` or bare millis |

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tp_common::cell::config::CellConfig;
use tp_common::config::{ConfigError, LogLevel, SharedConfig};
use tp_common::consts::TP_SERVICE_NAME;

/// Log level override.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Bind address override.
pub const ENV_API_ADDRESS: &str = "API_ADDRESS";
/// Request timeout override.
pub const ENV_API_TIMEOUT: &str = "API_TIMEOUT";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Bind address.
    pub address: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "localhost:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl HttpConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete `tp_api` configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Logging and instance name.
    pub shared: SharedConfig,
    /// HTTP server.
    pub api: HttpConfig,
    /// Simulated cell geometry and timing.
    pub cell: CellConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: LogLevel::Info,
                service_name: TP_SERVICE_NAME.to_string(),
            },
            api: HttpConfig::default(),
            cell: CellConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.api.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.address cannot be empty".to_string(),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_ms must be positive".to_string(),
            ));
        }
        self.cell.validate()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for an unparsable value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.shared.log_level = level.parse()?;
        }
        if let Some(address) = lookup(ENV_API_ADDRESS) {
            self.api.address = address;
        }
        if let Some(timeout) = lookup(ENV_API_TIMEOUT) {
            let timeout = parse_timeout(&timeout)?;
            self.api.timeout_ms = u64::try_from(timeout.as_millis()).map_err(|_| {
                ConfigError::ValidationError(format!("{ENV_API_TIMEOUT} out of range"))
            })?;
        }
        Ok(())
    }
}

/// Parse `5s`, `250ms` or a bare millisecond count.
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::ValidationError(format!("invalid timeout '{value}'"));

    let (number, millis_per_unit) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1000)
    } else {
        (value, 1)
    };
    let number: u64 = number.trim().parse().map_err(|_| invalid())?;
    number
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.address, "localhost:8080");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_timeout_formats() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_timeout(" 1500 ").unwrap(), Duration::from_millis(1500));
        assert!(parse_timeout("fast").is_err());
        assert!(parse_timeout("5m").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config
            .apply_overrides_from(env(&[
                ("LOG_LEVEL", "DEBUG"),
                ("API_ADDRESS", "0.0.0.0:9000"),
                ("API_TIMEOUT", "2s"),
            ]))
            .unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.api.address, "0.0.0.0:9000");
        assert_eq!(config.api.timeout_ms, 2000);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_overrides_from(env(&[("API_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ApiConfig::default();
        config.api.timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
