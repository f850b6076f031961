//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library.
//! Transport setup, output formatting and command dispatch are handled by the
//! application layer.

use crate::types::{DecoderError, Resolution, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Counts per revolution of both absolute encoders
    #[serde(default)]
    pub resolution: Resolution,

    /// Field separator within a sample line
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Minimum number of fields for a line to count as a sample
    #[serde(default = "default_min_fields")]
    pub min_fields: usize,

    /// Log a warning when a sample lies outside `[0, N)`
    #[serde(default = "default_true")]
    pub warn_out_of_range: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_min_fields() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            delimiter: default_delimiter(),
            min_fields: default_min_fields(),
            warn_out_of_range: true,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the encoder resolution
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder method: set the field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder method: set the minimum field count of a sample line
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    /// Builder method: enable or disable out-of-range warnings
    pub fn with_out_of_range_warnings(mut self, enabled: bool) -> Self {
        self.warn_out_of_range = enabled;
        self
    }

    /// Check that the configuration can drive a decoder
    pub fn validate(&self) -> Result<()> {
        if self.min_fields < 2 {
            return Err(DecoderError::InvalidConfig(format!(
                "min_fields must be at least 2 (got {})",
                self.min_fields
            )));
        }
        if self.delimiter.is_ascii_digit() || self.delimiter == '-' || self.delimiter == '+' {
            return Err(DecoderError::InvalidConfig(format!(
                "delimiter {:?} collides with integer syntax",
                self.delimiter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_config_builder() {
        let config = DecoderConfig::new()
            .with_resolution(Resolution::new(1024).unwrap())
            .with_delimiter(';')
            .with_min_fields(2)
            .with_out_of_range_warnings(false);

        assert_eq!(config.resolution.get(), 1024);
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.min_fields, 2);
        assert!(!config.warn_out_of_range);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::new();
        assert_eq!(config.resolution.get(), 4096);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.min_fields, 3);
        assert!(config.warn_out_of_range);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        assert!(DecoderConfig::new().with_min_fields(1).validate().is_err());
        assert!(DecoderConfig::new().with_delimiter('-').validate().is_err());
        assert!(DecoderConfig::new().with_delimiter('7').validate().is_err());
    }
}
