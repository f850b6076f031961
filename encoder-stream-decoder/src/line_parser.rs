//! Sample line parsing
//!
//! Turns one raw text line from the transport into an absolute sample pair.
//! Parsing is total: anything that does not look like a sample line yields
//! `None`, and the caller decides what to do with the raw text.

use crate::config::DecoderConfig;
use crate::types::AbsoluteSample;

/// Line parser - extracts the two encoder readings from a delimited line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParser {
    delimiter: char,
    min_fields: usize,
}

impl LineParser {
    /// Create a parser for `delimiter`-separated lines with at least `min_fields` fields
    ///
    /// `min_fields` below 2 is treated as 2, since two fields are always read.
    pub fn new(delimiter: char, min_fields: usize) -> Self {
        Self {
            delimiter,
            min_fields: min_fields.max(2),
        }
    }

    /// Create a parser from decoder configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.delimiter, config.min_fields)
    }

    /// Parse a raw line into an absolute sample pair
    ///
    /// # Returns
    /// * `Some((first, second))` if the line has at least `min_fields` fields
    ///   and the first two parse as integers
    /// * `None` otherwise (too few fields, or a non-integer field)
    ///
    /// Fields past the second are ignored. No range check is done here.
    pub fn parse(&self, line: &str) -> Option<(AbsoluteSample, AbsoluteSample)> {
        let mut fields = line.split(self.delimiter);
        let first = fields.next()?;
        let second = fields.next()?;

        // The trailing fields only have to exist
        let trailing = self.min_fields - 2;
        if fields.take(trailing).count() < trailing {
            return None;
        }

        Some((Self::parse_field(first)?, Self::parse_field(second)?))
    }

    fn parse_field(field: &str) -> Option<AbsoluteSample> {
        field
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .parse()
            .ok()
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::from_config(&DecoderConfig::default())
    }
}

/// Parse a line with the default `,` delimiter and three-field minimum
pub fn parse_line(line: &str) -> Option<(AbsoluteSample, AbsoluteSample)> {
    LineParser::default().parse(line)
}
