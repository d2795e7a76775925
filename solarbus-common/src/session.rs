use zenoh::Session;

use crate::config::ZenohConfig;
use crate::error::{Error, Result};

/// Build a Zenoh configuration from the bridge settings.
///
/// Split out of [`connect`] so the mapping can be checked without opening a
/// session.
pub fn build_zenoh_config(config: &ZenohConfig) -> Result<zenoh::Config> {
    let mut zenoh_config = zenoh::Config::default();

    let mode_str = match config.mode.as_str() {
        "client" | "peer" | "router" => format!("\"{}\"", config.mode),
        other => {
            return Err(Error::Config(format!(
                "Invalid Zenoh mode: '{}'. Expected 'client', 'peer', or 'router'",
                other
            )));
        }
    };

    zenoh_config
        .insert_json5("mode", &mode_str)
        .map_err(|e| Error::Config(format!("Failed to set mode: {}", e)))?;

    if !config.connect.is_empty() {
        let endpoints_json = serde_json::to_string(&config.connect)?;
        zenoh_config
            .insert_json5("connect/endpoints", &endpoints_json)
            .map_err(|e| Error::Config(format!("Failed to set connect endpoints: {}", e)))?;
    }

    if !config.listen.is_empty() {
        let endpoints_json = serde_json::to_string(&config.listen)?;
        zenoh_config
            .insert_json5("listen/endpoints", &endpoints_json)
            .map_err(|e| Error::Config(format!("Failed to set listen endpoints: {}", e)))?;
    }

    if let Some((user, password)) = config.credentials()? {
        // serde_json quoting keeps odd characters in credentials intact.
        zenoh_config
            .insert_json5("transport/auth/usrpwd/user", &serde_json::to_string(user)?)
            .map_err(|e| Error::Config(format!("Failed to set Zenoh user: {}", e)))?;
        zenoh_config
            .insert_json5(
                "transport/auth/usrpwd/password",
                &serde_json::to_string(password)?,
            )
            .map_err(|e| Error::Config(format!("Failed to set Zenoh password: {}", e)))?;
    }

    Ok(zenoh_config)
}

/// Connect to Zenoh using the provided configuration.
pub async fn connect(config: &ZenohConfig) -> Result<Session> {
    let zenoh_config = build_zenoh_config(config)?;

    tracing::info!(
        mode = %config.mode,
        connect = ?config.connect,
        listen = ?config.listen,
        auth = config.username.is_some(),
        "Connecting to Zenoh"
    );

    let session = zenoh::open(zenoh_config).await?;

    tracing::info!(zid = %session.zid(), "Connected to Zenoh");

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_rejected() {
        let config = ZenohConfig {
            mode: "broker".to_string(),
            ..Default::default()
        };
        assert!(matches!(build_zenoh_config(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_client_config_with_auth() {
        let config = ZenohConfig::default()
            .with_host("localhost")
            .unwrap()
            .with_credentials(Some("solar".to_string()), Some("secret".to_string()));

        assert!(build_zenoh_config(&config).is_ok());
    }

    #[test]
    fn test_half_credentials_fail_before_connect() {
        let config = ZenohConfig::default().with_credentials(None, Some("secret".to_string()));
        assert!(build_zenoh_config(&config).is_err());
    }
}
