//! Bridge status reporting.
//!
//! Status goes to `{key_prefix}/@/status`. Zenoh wildcards never match a
//! chunk starting with `@`, so subscribers of `{key_prefix}/*` only see
//! telemetry.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::publisher::{Publish, build_key};

/// Lifecycle state announced by a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    Running,
    Offline,
    Error,
}

/// Bridge status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    /// Bridge name (e.g., "solar").
    pub bridge: String,
    /// Bridge version.
    pub version: String,
    /// Current state.
    pub status: BridgeState,
    /// Error message when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Bridge-specific details (input path, forwarding counters, ...).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl BridgeStatus {
    fn new(bridge: &str, version: &str, status: BridgeState) -> Self {
        Self {
            bridge: bridge.to_string(),
            version: version.to_string(),
            status,
            error: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// Create a new status with "running" state.
    pub fn running(bridge: &str, version: &str) -> Self {
        Self::new(bridge, version, BridgeState::Running)
    }

    /// Create a status with "offline" state.
    pub fn offline(bridge: &str, version: &str) -> Self {
        Self::new(bridge, version, BridgeState::Offline)
    }

    /// Create a status with "error" state.
    pub fn error(bridge: &str, version: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(bridge, version, BridgeState::Error)
        }
    }

    /// Attach metadata to the status.
    pub fn with_metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        if let Some(metadata) = metadata {
            self.metadata = metadata;
        }
        self
    }
}

/// Publishes a bridge's lifecycle status.
pub struct StatusPublisher<P> {
    publisher: P,
    key: String,
    bridge_name: String,
    version: String,
}

impl<P: Publish> StatusPublisher<P> {
    /// Create a status publisher writing under `key_prefix`.
    pub fn new(
        publisher: P,
        key_prefix: &str,
        bridge_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            key: build_key(key_prefix, "@/status"),
            bridge_name: bridge_name.into(),
            version: version.into(),
        }
    }

    /// Key expression status is published on.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Publish a status message.
    pub async fn publish(&self, status: &BridgeStatus) -> Result<()> {
        let payload = serde_json::to_vec(status)?;
        self.publisher.publish(&self.key, payload).await
    }

    /// Publish "running" status with optional metadata.
    pub async fn publish_running(&self, metadata: Option<serde_json::Value>) -> Result<()> {
        let status =
            BridgeStatus::running(&self.bridge_name, &self.version).with_metadata(metadata);
        self.publish(&status).await
    }

    /// Publish "offline" status with optional metadata.
    pub async fn publish_offline(&self, metadata: Option<serde_json::Value>) -> Result<()> {
        let status =
            BridgeStatus::offline(&self.bridge_name, &self.version).with_metadata(metadata);
        self.publish(&status).await
    }

    /// Publish "error" status.
    pub async fn publish_error(&self, error: impl Into<String>) -> Result<()> {
        let status = BridgeStatus::error(&self.bridge_name, &self.version, error);
        self.publish(&status).await
    }
}
