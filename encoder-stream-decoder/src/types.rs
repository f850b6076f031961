//! Core types for the encoder stream decoder library
//!
//! This module defines the fundamental types the decoder works with: the
//! encoder resolution, absolute samples, the events emitted per received line,
//! and the error type shared by the whole crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Raw absolute encoder reading for one channel, nominally in `[0, N)`
pub type AbsoluteSample = i32;

/// Default resolution of the absolute encoders (12-bit, 0..4095)
pub const DEFAULT_RESOLUTION: u32 = 4096;

/// Errors that can occur while decoding an encoder stream
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid encoder resolution: {0} (must be greater than zero)")]
    InvalidResolution(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown motor command: {0:?}")]
    UnknownCommand(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Number of distinct absolute positions per encoder revolution
///
/// Always strictly positive; the only way to obtain one is through
/// [`Resolution::new`], which rejects zero and negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Resolution(u32);

impl Resolution {
    /// Create a resolution, failing for `N <= 0` or values beyond `u32`
    pub fn new(counts: i64) -> Result<Self> {
        match u32::try_from(counts) {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(DecoderError::InvalidResolution(counts)),
        }
    }

    /// Counts per revolution
    pub fn get(self) -> u32 {
        self.0
    }

    /// Half a revolution, truncated; the rollover detection threshold
    pub fn half(self) -> i64 {
        i64::from(self.0) / 2
    }

    /// True if `sample` lies in `[0, N)`
    pub fn contains(self, sample: AbsoluteSample) -> bool {
        sample >= 0 && i64::from(sample) < i64::from(self.0)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION)
    }
}

impl TryFrom<i64> for Resolution {
    type Error = DecoderError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Resolution> for u32 {
    fn from(resolution: Resolution) -> Self {
        resolution.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encoder channel of the two-motor stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// First comma-separated field
    First,
    /// Second comma-separated field
    Second,
}

impl Channel {
    /// Both channels in wire order
    pub const ALL: [Channel; 2] = [Channel::First, Channel::Second];

    /// Zero-based index into per-channel arrays
    pub fn index(self) -> usize {
        match self {
            Channel::First => 0,
            Channel::Second => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::First => write!(f, "Q1"),
            Channel::Second => write!(f, "Q2"),
        }
    }
}

/// Main event type - one per received line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A line that carried a sample pair; both channels were updated
    Positions {
        /// Time the line was processed
        timestamp: Timestamp,
        /// 1-based line number within the stream
        line_number: u64,
        /// Absolute samples as received
        absolute: [AbsoluteSample; 2],
        /// Incremental positions after the update
        positions: [i64; 2],
        /// The line exactly as received
        raw: String,
    },

    /// A line that did not parse; channel state is untouched
    Unparsed {
        /// Time the line was processed
        timestamp: Timestamp,
        /// 1-based line number within the stream
        line_number: u64,
        /// The line exactly as received
        raw: String,
    },
}

impl StreamEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> Timestamp {
        match self {
            StreamEvent::Positions { timestamp, .. } => *timestamp,
            StreamEvent::Unparsed { timestamp, .. } => *timestamp,
        }
    }

    /// Get the line number of this event
    pub fn line_number(&self) -> u64 {
        match self {
            StreamEvent::Positions { line_number, .. } => *line_number,
            StreamEvent::Unparsed { line_number, .. } => *line_number,
        }
    }

    /// The raw received text, regardless of parse success
    pub fn raw(&self) -> &str {
        match self {
            StreamEvent::Positions { raw, .. } => raw,
            StreamEvent::Unparsed { raw, .. } => raw,
        }
    }

    /// Incremental position pair, if this line produced one
    pub fn positions(&self) -> Option<[i64; 2]> {
        match self {
            StreamEvent::Positions { positions, .. } => Some(*positions),
            StreamEvent::Unparsed { .. } => None,
        }
    }
}
