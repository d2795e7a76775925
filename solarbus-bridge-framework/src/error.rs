//! Error types for the bridge framework.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in a bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Zenoh connection error.
    #[error("Zenoh connection error: {0}")]
    ZenohConnection(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Publishing error.
    #[error("Failed to publish to {key}: {message}")]
    Publish { key: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a publish error for `key`.
    pub fn publish(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Publish {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

impl From<solarbus_common::Error> for BridgeError {
    fn from(err: solarbus_common::Error) -> Self {
        match err {
            solarbus_common::Error::Io(e) => Self::Io(e),
            solarbus_common::Error::Zenoh(e) => Self::ZenohConnection(e.to_string()),
            solarbus_common::Error::Json(e) => Self::Serialization(e.to_string()),
            solarbus_common::Error::Cbor(e) => Self::Serialization(e),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<json5::Error> for BridgeError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_message() {
        let err = BridgeError::publish("solar/modules/26", "session closed");
        assert_eq!(
            err.to_string(),
            "Failed to publish to solar/modules/26: session closed"
        );
    }

    #[test]
    fn test_common_error_mapping() {
        let err: BridgeError = solarbus_common::Error::Config("bad mode".to_string()).into();
        assert!(matches!(err, BridgeError::Config(_)));

        let err: BridgeError = solarbus_common::Error::Cbor("eof".to_string()).into();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }
}
