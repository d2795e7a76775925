//! Forwarding loop: input lines in, one published message per decoded line out.

use std::future::Future;

use serde::Serialize;
use solarbus_bridge_framework::{BridgeError, Publish};
use solarbus_common::{Format, encode};
use thiserror::Error;
use tokio::io::AsyncBufRead;

use crate::decoder::{self, DecodeError, ModuleAddress, Reading};
use crate::source::LineSource;

/// Errors that end a forwarding run.
///
/// Malformed lines never show up here; they are skipped.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Failed to read input stream: {0}")]
    Source(#[from] std::io::Error),

    #[error("Failed to serialize reading for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: solarbus_common::Error,
    },

    #[error(transparent)]
    Publish(#[from] BridgeError),
}

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndOfStream,
    Shutdown,
}

/// Counters for one forwarding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForwardStats {
    pub lines_read: u64,
    pub published: u64,
    pub malformed_address: u64,
    pub malformed_reading: u64,
    pub stop_reason: StopReason,
}

impl ForwardStats {
    /// Lines that were read but not published.
    pub fn skipped(&self) -> u64 {
        self.malformed_address + self.malformed_reading
    }

    fn record_skip(&mut self, error: &DecodeError) {
        match error {
            DecodeError::MalformedAddress(_) => self.malformed_address += 1,
            DecodeError::MalformedReading(_) => self.malformed_reading += 1,
        }
    }
}

/// Key expression a module's readings are published on.
pub fn topic(key_prefix: &str, address: ModuleAddress) -> String {
    format!("{}/{}", key_prefix.trim_end_matches('/'), address)
}

/// Drives lines from a [`LineSource`] to a [`Publish`] implementation.
///
/// One line is decoded and, if valid, published before the next one is
/// read, so messages leave in input order with at most one in flight.
#[derive(Debug, Clone)]
pub struct StreamForwarder<P> {
    publisher: P,
    key_prefix: String,
    format: Format,
}

impl<P: Publish> StreamForwarder<P> {
    pub fn new(publisher: P, key_prefix: impl Into<String>, format: Format) -> Self {
        Self {
            publisher,
            key_prefix: key_prefix.into(),
            format,
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Forward until the source is exhausted.
    pub async fn run<R>(&self, source: LineSource<R>) -> Result<ForwardStats, ForwardError>
    where
        R: AsyncBufRead + Unpin,
    {
        self.run_until(source, std::future::pending()).await
    }

    /// Forward until the source is exhausted or `shutdown` resolves.
    ///
    /// `shutdown` is only raced against reading the next line. A publish
    /// that has started always completes first.
    ///
    /// The source is consumed and closed when this returns, on every path.
    pub async fn run_until<R, F>(
        &self,
        mut source: LineSource<R>,
        shutdown: F,
    ) -> Result<ForwardStats, ForwardError>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = ForwardStats::default();

        loop {
            let line = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    stats.stop_reason = StopReason::Shutdown;
                    break;
                }
                line = source.next_line() => line?,
            };

            let Some(line) = line else {
                stats.stop_reason = StopReason::EndOfStream;
                break;
            };
            stats.lines_read += 1;

            match decoder::decode(&line) {
                Ok((address, reading)) => {
                    self.forward(address, &reading).await?;
                    stats.published += 1;
                }
                Err(e) => {
                    stats.record_skip(&e);
                    tracing::debug!(error = %e, line = %line.trim_end(), "Skipping malformed line");
                }
            }
        }

        tracing::info!(
            lines = stats.lines_read,
            published = stats.published,
            skipped = stats.skipped(),
            reason = ?stats.stop_reason,
            "Input stream finished"
        );

        Ok(stats)
    }

    async fn forward(&self, address: ModuleAddress, reading: &Reading) -> Result<(), ForwardError> {
        let key = topic(&self.key_prefix, address);
        let payload = encode(reading, self.format).map_err(|source| {
            ForwardError::Serialization {
                key: key.clone(),
                source,
            }
        })?;

        self.publisher.publish(&key, payload).await?;

        tracing::trace!(
            key = %key,
            count = reading.count,
            voltage = reading.voltage,
            temperature = reading.temperature,
            "Forwarded reading"
        );

        Ok(())
    }
}
