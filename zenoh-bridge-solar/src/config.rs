//! Solar bridge configuration.

use serde::{Deserialize, Serialize};
use solarbus_bridge_framework::{BridgeConfig, BridgeError, Format, LoggingConfig, ZenohConfig};

/// Default key expression prefix; readings go to `solar/modules/<address>`.
pub const DEFAULT_KEY_PREFIX: &str = "solar/modules";

/// Complete solar bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolarBridgeConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Solar telemetry settings.
    #[serde(default)]
    pub solar: SolarConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input and publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    /// Path of the telemetry stream: a file, FIFO or serial device.
    #[serde(default)]
    pub input_stream: Option<String>,

    /// Key expression prefix for publishing.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Payload encoding. `json` matches what existing subscribers expect.
    #[serde(default)]
    pub serialization: Format,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            input_stream: None,
            key_prefix: default_key_prefix(),
            serialization: Format::default(),
        }
    }
}

impl SolarBridgeConfig {
    /// Path of the input stream; only valid after [`validate`](BridgeConfig::validate).
    pub fn input_stream(&self) -> &str {
        self.solar.input_stream.as_deref().unwrap_or_default()
    }
}

impl BridgeConfig for SolarBridgeConfig {
    fn zenoh(&self) -> &ZenohConfig {
        &self.zenoh
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn key_prefix(&self) -> &str {
        &self.solar.key_prefix
    }

    fn validate(&self) -> solarbus_bridge_framework::Result<()> {
        match self.solar.input_stream.as_deref() {
            None => {
                return Err(BridgeError::validation(
                    "No input stream configured (use --input-stream or solar.input_stream)",
                ));
            }
            Some(path) if path.trim().is_empty() => {
                return Err(BridgeError::validation("Input stream path is empty"));
            }
            Some(_) => {}
        }

        let prefix = &self.solar.key_prefix;
        if prefix.is_empty() {
            return Err(BridgeError::validation("key_prefix must not be empty"));
        }
        if prefix.contains(['*', '$', '?', '#']) {
            return Err(BridgeError::validation(format!(
                "key_prefix '{}' must not contain wildcards",
                prefix
            )));
        }

        self.zenoh
            .credentials()
            .map_err(|e| BridgeError::validation(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{
            solar: { input_stream: "/dev/ttyUSB0" }
        }"#;

        let config: SolarBridgeConfig = json5::from_str(json).unwrap();
        assert_eq!(config.input_stream(), "/dev/ttyUSB0");
        assert_eq!(config.solar.key_prefix, "solar/modules");
        assert_eq!(config.solar.serialization, Format::Json);
        assert_eq!(config.zenoh.mode, "peer");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            zenoh: {
                mode: "client",
                connect: ["tcp/broker:7447"],
                username: "solar",
                password: "secret",
            },
            solar: {
                input_stream: "/run/solar.fifo",
                key_prefix: "site1/solar/modules",
                serialization: "cbor",
            },
            logging: {
                level: "debug",
                format: "json",
            },
        }"#;

        let config: SolarBridgeConfig = json5::from_str(json).unwrap();
        assert_eq!(config.zenoh.connect, vec!["tcp/broker:7447"]);
        assert_eq!(config.key_prefix(), "site1/solar/modules");
        assert_eq!(config.solar.serialization, Format::Cbor);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_input() {
        let config = SolarBridgeConfig::default();
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_validate_wildcard_prefix() {
        let json = r#"{ solar: { input_stream: "in.log", key_prefix: "solar/*" } }"#;
        let config: SolarBridgeConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_half_credentials() {
        let json = r#"{ zenoh: { username: "solar" }, solar: { input_stream: "in.log" } }"#;
        let config: SolarBridgeConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }
}
