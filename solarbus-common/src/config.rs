use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Port used when a host is given without one.
pub const DEFAULT_ZENOH_PORT: u16 = 7447;

/// Zenoh connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZenohConfig {
    /// Zenoh mode: "client", "peer", or "router".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Endpoints to connect to (for client mode).
    #[serde(default)]
    pub connect: Vec<String>,

    /// Endpoints to listen on (for peer/router mode).
    #[serde(default)]
    pub listen: Vec<String>,

    /// User name for Zenoh user/password authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for Zenoh user/password authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_mode() -> String {
    "peer".to_string()
}

impl Default for ZenohConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            connect: Vec::new(),
            listen: Vec::new(),
            username: None,
            password: None,
        }
    }
}

impl ZenohConfig {
    /// Point the session at a single host, switching to client mode.
    ///
    /// Accepts a full Zenoh locator (`tcp/10.0.0.1:7447`), `host:port`, or a
    /// bare host name which gets [`DEFAULT_ZENOH_PORT`].
    pub fn with_host(mut self, host: &str) -> Result<Self> {
        self.mode = "client".to_string();
        self.connect = vec![endpoint_for_host(host)?];
        Ok(self)
    }

    /// Set credentials. Empty strings count as unset.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        if let Some(user) = username.filter(|u| !u.is_empty()) {
            self.username = Some(user);
        }
        if let Some(pwd) = password.filter(|p| !p.is_empty()) {
            self.password = Some(pwd);
        }
        self
    }

    /// The configured user/password pair, if authentication is enabled.
    ///
    /// Empty strings are treated as absent. Returns an error if only one
    /// half of the pair is present.
    pub fn credentials(&self) -> Result<Option<(&str, &str)>> {
        let user = self.username.as_deref().filter(|u| !u.is_empty());
        let pwd = self.password.as_deref().filter(|p| !p.is_empty());

        match (user, pwd) {
            (Some(user), Some(pwd)) => Ok(Some((user, pwd))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::Config(
                "Zenoh username is set but password is missing".to_string(),
            )),
            (None, Some(_)) => Err(Error::Config(
                "Zenoh password is set but username is missing".to_string(),
            )),
        }
    }
}

/// Turn a host argument into a Zenoh locator.
pub fn endpoint_for_host(host: &str) -> Result<String> {
    let host = host.trim();

    if host.is_empty() {
        return Err(Error::Endpoint {
            endpoint: host.to_string(),
            reason: "host is empty".to_string(),
        });
    }

    // Already a locator such as "tcp/host:port" or "udp/host:port".
    if host.contains('/') {
        return Ok(host.to_string());
    }

    if let Some(rest) = host.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((_, "")) => Ok(format!("tcp/{}:{}", host, DEFAULT_ZENOH_PORT)),
            Some((_, port)) if parse_port(port.strip_prefix(':')).is_some() => {
                Ok(format!("tcp/{}", host))
            }
            _ => Err(Error::Endpoint {
                endpoint: host.to_string(),
                reason: "malformed bracketed address".to_string(),
            }),
        };
    }

    match host.rsplit_once(':') {
        None => Ok(format!("tcp/{}:{}", host, DEFAULT_ZENOH_PORT)),
        Some((name, port)) if !name.contains(':') => {
            if parse_port(Some(port)).is_some() {
                Ok(format!("tcp/{}", host))
            } else {
                Err(Error::Endpoint {
                    endpoint: host.to_string(),
                    reason: format!("invalid port '{}'", port),
                })
            }
        }
        // Bare IPv6 address without brackets.
        Some(_) => Ok(format!("tcp/[{}]:{}", host, DEFAULT_ZENOH_PORT)),
    }
}

fn parse_port(port: Option<&str>) -> Option<u16> {
    port.and_then(|p| p.parse::<u16>().ok())
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
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

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
