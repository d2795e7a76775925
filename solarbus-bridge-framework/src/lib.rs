//! solarbus Bridge Framework
//!
//! Common abstractions for bridges that forward telemetry onto Zenoh.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeArgs`] for common CLI arguments (config file, Zenoh connection overrides)
//! - [`Publish`], the publish capability bridges forward into, and [`Publisher`],
//!   its Zenoh implementation
//! - [`BridgeRunner`] for the session lifecycle (connect once, close on every exit path)
//! - [`BridgeStatus`] for standardized status reporting
//!
//! # Example
//!
//! ```ignore
//! use solarbus_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, shutdown_signal};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = BridgeArgs::parse();
//!     let config = MyBridgeConfig::load(args.config.as_ref().unwrap())?;
//!
//!     let runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
//!
//!     let stats = runner
//!         .run_to_completion(
//!             None,
//!             |publisher| async move { my_loop(publisher, shutdown_signal()).await },
//!             |stats| serde_json::to_value(stats).ok(),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod error;
mod publisher;
mod runner;
mod status;

pub use args::BridgeArgs;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use publisher::{Publish, Publisher};
pub use runner::{BridgeRunner, shutdown_signal};
pub use status::{BridgeState, BridgeStatus, StatusPublisher};

// Re-export commonly used types from solarbus-common
pub use solarbus_common::{Format, LoggingConfig, ZenohConfig};
