//! Human-readable size strings and canonical byte counts.
//!
//! The console reports filesystem sizes the way `df -h` prints them
//! (`"100G"`, `"1.5T"`, `"512M"`). Those values are gigabyte-scaled: a bare
//! number is already in gigabytes, and the suffix scales relative to that.
//! Per-account usage arrives as megabytes instead (`usedMB`), so both paths
//! collapse into a byte count before any comparison or arithmetic.

use std::fmt;

use thiserror::Error;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// Suffix to gigabyte-scale multiplier. Unknown or absent suffixes use 1.
const UNITS: &[(char, f64)] = &[
    ('K', 1.0 / 1_048_576.0),
    ('M', 1.0 / 1024.0),
    ('G', 1.0),
    ('T', 1024.0),
];

/// Why a size string could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    #[error("empty size string")]
    Empty,
    #[error("no numeric magnitude in {0:?}")]
    NoMagnitude(String),
}

/// Parse a size string into its gigabyte-scaled magnitude.
///
/// Anything without a leading number yields `0.0`; use [`try_parse_size`]
/// to observe the failure.
pub fn parse_size(input: &str) -> f64 {
    try_parse_size(input).unwrap_or(0.0)
}

/// Parse a size string like `"100G"`, `"1.5T"` or `"42"`.
///
/// Suffixes are single, case-sensitive letters. A bare number is returned
/// unchanged, so canonical values parse to themselves.
pub fn try_parse_size(input: &str) -> Result<f64, SizeParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(SizeParseError::Empty);
    }

    let (magnitude, rest) = split_magnitude(s);
    let value: f64 = magnitude
        .parse()
        .map_err(|_| SizeParseError::NoMagnitude(s.to_string()))?;

    let multiplier = rest
        .chars()
        .next()
        .and_then(|c| UNITS.iter().find(|(suffix, _)| *suffix == c))
        .map(|(_, m)| *m)
        .unwrap_or(1.0);

    Ok(value * multiplier)
}

/// Split off the leading `digits[.digits]` token.
fn split_magnitude(s: &str) -> (&str, &str) {
    let mut seen_dot = false;
    let end = s
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Canonical byte count for a gigabyte-scaled size string.
pub fn size_to_bytes(input: &str) -> u64 {
    scaled_to_bytes(parse_size(input), GIB)
}

/// Canonical byte count for a megabyte value reported by the API.
pub fn megabytes_to_bytes(mb: f64) -> u64 {
    scaled_to_bytes(mb, MIB)
}

/// Bytes back to (fractional) megabytes, for display and export.
pub fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

fn scaled_to_bytes(value: f64, scale: f64) -> u64 {
    let bytes = value * scale;
    if bytes.is_nan() || bytes <= 0.0 {
        0
    } else {
        bytes.round() as u64
    }
}

/// Parse a `df`-style percentage such as `"45%"`. Unreadable input yields 0.
pub fn parse_percentage(input: &str) -> f64 {
    let s = input.trim();
    let (magnitude, _) = split_magnitude(s);
    magnitude.parse().unwrap_or(0.0)
}

/// Binary size units used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeUnit {
    KiB,
    MiB,
    GiB,
    TiB,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    pub fn bytes(self) -> f64 {
        match self {
            SizeUnit::KiB => KIB,
            SizeUnit::MiB => MIB,
            SizeUnit::GiB => GIB,
            SizeUnit::TiB => TIB,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeUnit::KiB => "KiB",
            SizeUnit::MiB => "MiB",
            SizeUnit::GiB => "GiB",
            SizeUnit::TiB => "TiB",
        }
    }
}

/// A magnitude paired with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeQuantity {
    pub magnitude: f64,
    pub unit: SizeUnit,
}

impl SizeQuantity {
    /// Express `bytes` in the largest unit whose magnitude is at least 1.
    pub fn from_bytes(bytes: u64) -> Self {
        let b = bytes as f64;
        let unit = [SizeUnit::TiB, SizeUnit::GiB, SizeUnit::MiB]
            .into_iter()
            .find(|u| b >= u.bytes())
            .unwrap_or(SizeUnit::KiB);
        Self {
            magnitude: b / unit.bytes(),
            unit,
        }
    }

    /// Byte count, rounded to the nearest byte.
    pub fn bytes(&self) -> u64 {
        scaled_to_bytes(self.magnitude, self.unit.bytes())
    }
}

impl fmt::Display for SizeQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.magnitude, self.unit.label())
    }
}

/// Format a byte count for display, e.g. `"1.50 GiB"`.
pub fn format_bytes(bytes: u64) -> String {
    SizeQuantity::from_bytes(bytes).to_string()
}
