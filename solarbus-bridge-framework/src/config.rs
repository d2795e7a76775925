//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};
use crate::{LoggingConfig, ZenohConfig};

/// Trait for bridge configuration types.
///
/// Implement this trait for a bridge's configuration struct to get
/// JSON5 loading, validation, and access to the common config fields.
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the Zenoh configuration.
    fn zenoh(&self) -> &ZenohConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Get the key expression prefix for this bridge.
    fn key_prefix(&self) -> &str;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Override to add custom validation.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when one is given (defaults otherwise), let the
    /// caller apply command-line overrides, then validate.
    fn load_with<F>(path: Option<&Path>, overrides: F) -> Result<Self>
    where
        Self: Default,
        F: FnOnce(&mut Self),
    {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(BridgeError::ConfigNotFound {
                        path: path.display().to_string(),
                    });
                }
                json5::from_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        overrides(&mut config);
        config.validate()?;

        Ok(config)
    }
}
