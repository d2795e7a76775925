//! Bridge runner for lifecycle management.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use solarbus_common::{LoggingConfig, connect, init_tracing};

use crate::BridgeArgs;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::publisher::Publisher;
use crate::status::StatusPublisher;

/// Bridge runner that owns the Zenoh session for one bridge run.
///
/// Handles:
/// - Logging initialization
/// - Zenoh connection (with CLI host/user/password overrides)
/// - Status publishing (optional)
/// - Closing the session however the bridge's work ends
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging and status.
    name: String,
    /// Bridge version.
    version: String,
    /// The loaded configuration.
    config: C,
    /// Zenoh session.
    session: Arc<zenoh::Session>,
    /// Publisher for telemetry.
    publisher: Publisher,
    /// Status publisher (optional).
    status_publisher: Option<StatusPublisher<Publisher>>,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner.
    pub async fn new(name: impl Into<String>, config: C) -> Result<Self> {
        Self::new_with_args(name, config, None).await
    }

    /// Create a new bridge runner, applying CLI overrides.
    ///
    /// This will:
    /// 1. Initialize logging (`--log-level` beats the config file)
    /// 2. Connect to Zenoh (`--host`, `--user`, `--password` beat the config file)
    /// 3. Create the publisher
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&BridgeArgs>,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION").to_string();

        let log_config = match args.and_then(|a| a.log_level.as_ref()) {
            Some(level) => LoggingConfig {
                level: level.clone(),
                format: config.logging().format,
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| BridgeError::config(e.to_string()))?;

        tracing::info!(bridge = %name, version = %version, "Starting bridge");

        let zenoh_config = match args {
            Some(args) => args.apply_to(config.zenoh().clone())?,
            None => config.zenoh().clone(),
        };

        let session = Arc::new(
            connect(&zenoh_config)
                .await
                .map_err(|e| BridgeError::ZenohConnection(e.to_string()))?,
        );

        let publisher = Publisher::new(session.clone(), config.key_prefix());

        Ok(Self {
            name,
            version,
            config,
            session,
            publisher,
            status_publisher: None,
        })
    }

    /// Enable status publishing.
    ///
    /// The runner then announces `running` before the work starts and
    /// `offline` or `error` once it ends.
    pub fn with_status_publishing(mut self) -> Self {
        self.status_publisher = Some(StatusPublisher::new(
            self.publisher.clone(),
            self.config.key_prefix(),
            &self.name,
            &self.version,
        ));
        self
    }

    /// Get the bridge name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get a reference to the Zenoh session.
    pub fn session(&self) -> &Arc<zenoh::Session> {
        &self.session
    }

    /// Run the bridge's work to completion, then tear the session down.
    ///
    /// `work` gets the publisher and is awaited on the current task. The
    /// final status is `offline` (with `summary` applied to the work's
    /// output) on success and `error` on failure. The Zenoh session is
    /// closed on both paths and the work's result is returned unchanged.
    pub async fn run_to_completion<T, E, W, Fut, S>(
        self,
        metadata: Option<serde_json::Value>,
        work: W,
        summary: S,
    ) -> std::result::Result<T, E>
    where
        W: FnOnce(Publisher) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
        S: FnOnce(&T) -> Option<serde_json::Value>,
    {
        if let Some(ref status_pub) = self.status_publisher {
            if let Err(e) = status_pub.publish_running(metadata).await {
                tracing::warn!(error = %e, "Failed to publish running status");
            }
        }

        tracing::info!(bridge = %self.name, "Bridge running");

        let result = work(self.publisher.clone()).await;

        if let Some(ref status_pub) = self.status_publisher {
            let published = match &result {
                Ok(output) => status_pub.publish_offline(summary(output)).await,
                Err(e) => status_pub.publish_error(e.to_string()).await,
            };
            if let Err(e) = published {
                tracing::warn!(error = %e, "Failed to publish final status");
            }
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "Error closing Zenoh session");
        }

        match &result {
            Ok(_) => tracing::info!(bridge = %self.name, "Bridge stopped"),
            Err(e) => tracing::error!(bridge = %self.name, error = %e, "Bridge failed"),
        }

        result
    }
}

/// Resolves when the process receives Ctrl+C.
///
/// If the signal handler cannot be installed the future never resolves, so
/// the bridge keeps running until its input ends.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
