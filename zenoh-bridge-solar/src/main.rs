//! Zenoh bridge for solar module telemetry.
//!
//! Reads a telemetry stream (file, FIFO or serial device), decodes each
//! line and publishes the readings to Zenoh until the stream ends or
//! Ctrl+C is pressed.

use anyhow::Result;
use clap::Parser;
use solarbus_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, shutdown_signal};
use zenoh_bridge_solar::config::SolarBridgeConfig;
use zenoh_bridge_solar::{ForwardError, LineSource, StreamForwarder};

/// Receive solar module telemetry and publish it via Zenoh.
#[derive(Parser, Debug)]
#[command(name = "zenoh-bridge-solar")]
#[command(version)]
struct Args {
    /// Input stream or file (overrides `solar.input_stream`).
    #[arg(short, long)]
    input_stream: Option<String>,

    #[command(flatten)]
    bridge: BridgeArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = SolarBridgeConfig::load_with(args.bridge.config.as_deref(), |config| {
        if let Some(input) = args.input_stream.clone() {
            config.solar.input_stream = Some(input);
        }
    })?;

    let runner = BridgeRunner::new_with_args("solar", config, Some(&args.bridge))
        .await?
        .with_status_publishing();

    let input = runner.config().input_stream().to_string();
    let format = runner.config().solar.serialization;

    let metadata = serde_json::json!({
        "input_stream": &input,
        "serialization": format.mime_type(),
    });

    tracing::info!(
        input = %input,
        prefix = %runner.config().key_prefix(),
        "Forwarding solar telemetry"
    );

    runner
        .run_to_completion(
            Some(metadata),
            |publisher| async move {
                let source = LineSource::open(&input)
                    .await
                    .map_err(ForwardError::Source)?;
                let key_prefix = publisher.key_prefix().to_string();
                let forwarder = StreamForwarder::new(publisher, key_prefix, format);
                forwarder.run_until(source, shutdown_signal()).await
            },
            |stats| serde_json::to_value(stats).ok(),
        )
        .await?;

    Ok(())
}
