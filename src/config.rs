//! Configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name, used in logs and the API reference title.
    pub name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Directory for rolling log files. Console only when `None`.
    pub log_dir: Option<PathBuf>,
    /// libSQL database file (`:memory:` for an ephemeral store).
    pub db_path: PathBuf,
    /// Deadline applied to every request, persistence round trips included.
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Palaam".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_dir: None,
            db_path: PathBuf::from("./data/palaam.db"),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: "REQUEST_TIMEOUT_SECS".into(),
                    message: format!("{raw:?}: {e}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "REQUEST_TIMEOUT_SECS".into(),
                        message: "must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        Ok(Self {
            name: var("APP_NAME").unwrap_or(defaults.name),
            host: var("HOST").unwrap_or(defaults.host),
            port,
            log_level: var("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
            log_dir: var("LOG_DIR").map(PathBuf::from),
            db_path: var("PALAAM_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            request_timeout,
        })
    }

    /// Socket address to bind the HTTP server to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "HOST".into(),
                message: format!("{:?}: {e}", self.host),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.name, "Palaam");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.log_dir.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_NAME", "Clinic"),
            ("PORT", "9090"),
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_DIR", "/var/log/palaam"),
            ("PALAAM_DB_PATH", ":memory:"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.name, "Clinic");
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/palaam")));
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "  "), ("APP_NAME", "")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.name, "Palaam");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:3000");
    }
}
