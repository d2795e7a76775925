//! Zenoh bridge for solar module telemetry.
//!
//! Reads the line-oriented telemetry stream of a solar monitoring bus and
//! publishes one message per decoded line.
//!
//! # Line Format
//!
//! ```text
//! <address><delimiter> [ignored tokens...] <count>,<voltage_raw>,<temperature_raw>
//! ```
//!
//! Voltage and temperature are sent in tenths. Lines that do not decode are
//! skipped; a failed publish ends the run.
//!
//! # Key Expression Format
//!
//! Readings are published to:
//! ```text
//! {prefix}/{address}
//! ```
//!
//! For example:
//! ```text
//! solar/modules/26  {"count": 120, "voltage": 34.5, "temperature": 21.0}
//! ```

pub mod config;
pub mod decoder;
pub mod forwarder;
pub mod source;

pub use decoder::{DecodeError, LINE_LEN, ModuleAddress, Reading, decode};
pub use forwarder::{ForwardError, ForwardStats, StopReason, StreamForwarder, topic};
pub use source::{LineSource, StreamInput};
