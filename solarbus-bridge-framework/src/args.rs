//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Parser;

use crate::ZenohConfig;
use crate::error::{BridgeError, Result};

/// Common CLI arguments for all bridges.
///
/// Bridges embed these with `#[command(flatten)]` next to their own flags.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "solarbus telemetry bridge")]
pub struct BridgeArgs {
    /// Path to a JSON5 configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Zenoh host to connect to (`host`, `host:port` or a locator like `tcp/host:7447`).
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Zenoh user name (empty means no authentication).
    #[arg(short, long)]
    pub user: Option<String>,

    /// Zenoh password (empty means no authentication).
    #[arg(short, long)]
    pub password: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl BridgeArgs {
    /// Parse CLI arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Apply the connection overrides from the command line to a Zenoh config.
    pub fn apply_to(&self, zenoh: ZenohConfig) -> Result<ZenohConfig> {
        let zenoh = match self.host.as_deref() {
            Some(host) => zenoh
                .with_host(host)
                .map_err(|e| BridgeError::config(e.to_string()))?,
            None => zenoh,
        };

        Ok(zenoh.with_credentials(self.user.clone(), self.password.clone()))
    }
}
