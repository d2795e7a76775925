//! Decoder for solar module telemetry lines.
//!
//! A line looks like
//!
//! ```text
//! 0x1A: 00120,0345,0210
//! ```
//!
//! The first space-separated token is the module address followed by a
//! delimiter, the last token is `count,voltage_raw,temperature_raw`.
//! Voltage and temperature are transmitted in tenths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lines are cut down to their trailing `LINE_LEN` characters before decoding.
///
/// Some transports prepend timestamps; the payload always fits in the tail.
pub const LINE_LEN: usize = 137;

/// Address of the module a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleAddress(pub u64);

impl std::fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded module observation.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sample counter reported by the module. Counters outside `i64` are
    /// rejected as malformed.
    pub count: i64,
    /// Volts.
    pub voltage: f64,
    /// Degrees.
    pub temperature: f64,
}

/// Why a line could not be decoded. Carries the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed module address {0:?}")]
    MalformedAddress(String),

    #[error("malformed reading {0:?}")]
    MalformedReading(String),
}

/// Decode one raw line into the module address and its reading.
///
/// The line may still carry its terminator. Nothing is returned unless both
/// the address and all three reading fields parse.
pub fn decode(line: &str) -> Result<(ModuleAddress, Reading), DecodeError> {
    let line = truncate(line).trim();

    let mut tokens = line.split(' ');
    let address = parse_address(tokens.next().unwrap_or_default())?;

    // Only the last token carries the reading; anything in between is ignored.
    let reading_token = tokens
        .last()
        .ok_or_else(|| DecodeError::MalformedReading(String::new()))?;

    Ok((address, parse_reading(reading_token)?))
}

/// Keep the trailing [`LINE_LEN`] characters of `line`.
pub fn truncate(line: &str) -> &str {
    match line.char_indices().rev().nth(LINE_LEN - 1) {
        Some((start, _)) => &line[start..],
        None => line,
    }
}

fn parse_address(token: &str) -> Result<ModuleAddress, DecodeError> {
    let malformed = || DecodeError::MalformedAddress(token.to_string());

    let body = match token.chars().last() {
        None => return Err(malformed()),
        // ASCII, so the delimiter is exactly one byte.
        Some(c) if c.is_ascii_punctuation() => &token[..token.len() - 1],
        Some(_) => token,
    };

    parse_integer(body).map(ModuleAddress).ok_or_else(malformed)
}

/// Parse an unsigned integer with an optional `0x`, `0o` or `0b` prefix.
///
/// Without a prefix the body is decimal, unless it contains hex letters, in
/// which case it is read as hexadecimal (`1A` is 26).
fn parse_integer(body: &str) -> Option<u64> {
    let (digits, radix) = match body.get(..2) {
        Some("0x" | "0X") => (&body[2..], 16),
        Some("0o" | "0O") => (&body[2..], 8),
        Some("0b" | "0B") => (&body[2..], 2),
        _ if body.bytes().any(|b| b.is_ascii_alphabetic()) => (body, 16),
        _ => (body, 10),
    };

    // from_str_radix would also accept a leading '+'.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u64::from_str_radix(digits, radix).ok()
}

fn parse_reading(token: &str) -> Result<Reading, DecodeError> {
    let malformed = || DecodeError::MalformedReading(token.to_string());

    let mut fields = token.split(',').map(str::trim);
    let (Some(count), Some(voltage), Some(temperature)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    Ok(Reading {
        count: count.parse().map_err(|_| malformed())?,
        voltage: parse_tenths(voltage).ok_or_else(malformed)?,
        temperature: parse_tenths(temperature).ok_or_else(malformed)?,
    })
}

/// A raw field in tenths, scaled to units. Non-finite values are rejected
/// since they have no JSON representation.
fn parse_tenths(field: &str) -> Option<f64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / 10.0)
}
