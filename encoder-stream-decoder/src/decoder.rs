//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct owns the line parser, the unwrapper and the state of
//! both encoder channels, and turns received lines into stream events.

use crate::config::DecoderConfig;
use crate::line_parser::LineParser;
use crate::transport::LineReader;
use crate::types::{AbsoluteSample, Channel, Result, StreamEvent};
use crate::unwrapper::{EncoderUnwrapper, Rollover, UnwrapperState};
use chrono::Utc;
use std::io::Read;

/// Counters collected while decoding a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Lines seen, parsed or not
    pub lines: u64,
    /// Lines that produced a sample pair
    pub samples: u64,
    /// Lines that did not parse
    pub unparsed: u64,
    /// Forward rollovers per channel
    pub forward_rollovers: [u64; 2],
    /// Backward rollovers per channel
    pub backward_rollovers: [u64; 2],
    /// Samples outside `[0, N)`
    pub out_of_range: u64,
}

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    config: DecoderConfig,
    parser: LineParser,
    unwrapper: EncoderUnwrapper,
    channels: [UnwrapperState; 2],
    stats: DecoderStats,
}

impl Decoder {
    /// Create a new decoder instance
    ///
    /// Fails if the configuration does not validate.
    ///
    /// # Example
    /// ```
    /// use encoder_stream_decoder::{Decoder, DecoderConfig};
    ///
    /// let mut decoder = Decoder::new(DecoderConfig::new()).unwrap();
    /// decoder.process_line("4095,100,0\n");
    /// let event = decoder.process_line("5,90,0\n");
    /// assert_eq!(event.positions(), Some([6, -10]));
    /// ```
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating decoder: resolution {}, delimiter {:?}, min fields {}",
            config.resolution,
            config.delimiter,
            config.min_fields
        );

        Ok(Self {
            parser: LineParser::from_config(&config),
            unwrapper: EncoderUnwrapper::new(config.resolution),
            channels: [UnwrapperState::Uninitialized; 2],
            stats: DecoderStats::default(),
            config,
        })
    }

    /// Decode one received line
    ///
    /// A line carrying a sample pair updates both channels and yields
    /// [`StreamEvent::Positions`]. Anything else yields
    /// [`StreamEvent::Unparsed`] and leaves both channels untouched.
    pub fn process_line(&mut self, raw: &str) -> StreamEvent {
        self.stats.lines += 1;
        let line_number = self.stats.lines;
        let timestamp = Utc::now();

        let Some((first, second)) = self.parser.parse(raw) else {
            self.stats.unparsed += 1;
            log::debug!("Line {} is not a sample line: {:?}", line_number, raw.trim_end());
            return StreamEvent::Unparsed {
                timestamp,
                line_number,
                raw: raw.to_string(),
            };
        };

        self.stats.samples += 1;
        let positions = [
            self.update_channel(Channel::First, first),
            self.update_channel(Channel::Second, second),
        ];
        log::trace!(
            "Line {}: absolute ({}, {}) -> incremental ({}, {})",
            line_number,
            first,
            second,
            positions[0],
            positions[1]
        );

        StreamEvent::Positions {
            timestamp,
            line_number,
            absolute: [first, second],
            positions,
            raw: raw.to_string(),
        }
    }

    fn update_channel(&mut self, channel: Channel, sample: AbsoluteSample) -> i64 {
        let index = channel.index();

        if !self.config.resolution.contains(sample) {
            self.stats.out_of_range += 1;
            if self.config.warn_out_of_range {
                log::warn!(
                    "{} sample {} outside [0, {}), unwrapping anyway",
                    channel,
                    sample,
                    self.config.resolution
                );
            }
        }

        let step = self.unwrapper.step(&mut self.channels[index], sample);
        match step.rollover {
            Rollover::Forward => {
                self.stats.forward_rollovers[index] += 1;
                log::debug!("{} rolled over forward at {}", channel, sample);
            }
            Rollover::Backward => {
                self.stats.backward_rollovers[index] += 1;
                log::debug!("{} rolled over backward at {}", channel, sample);
            }
            Rollover::None => {}
        }
        step.position
    }

    /// Decode a byte stream and return an iterator of stream events
    ///
    /// Each line is processed to completion before the next one is read.
    ///
    /// # Example
    /// ```
    /// use encoder_stream_decoder::{Decoder, DecoderConfig};
    /// use std::io::Cursor;
    ///
    /// let mut decoder = Decoder::new(DecoderConfig::new()).unwrap();
    /// let input = Cursor::new("200,0,x\nhello\n250,4000,x\n");
    /// let positions: Vec<_> = decoder
    ///     .decode_reader(input)
    ///     .filter_map(|e| e.ok().and_then(|e| e.positions()))
    ///     .collect();
    /// assert_eq!(positions, vec![[0, 0], [50, -96]]);
    /// ```
    pub fn decode_reader<R: Read>(&mut self, reader: R) -> DecodingIterator<'_, R> {
        self.decode_lines(LineReader::new(reader))
    }

    /// Like [`decode_reader`](Self::decode_reader), with a preconfigured line reader
    ///
    /// Use this with [`LineReader::follow`] for tty devices whose read
    /// timeout shows up as an empty read.
    pub fn decode_lines<R: Read>(&mut self, lines: LineReader<R>) -> DecodingIterator<'_, R> {
        log::info!("Decoding stream");
        DecodingIterator {
            lines,
            decoder: self,
        }
    }

    /// Current incremental positions, `None` for a channel without samples yet
    pub fn positions(&self) -> [Option<i64>; 2] {
        [self.channels[0].position(), self.channels[1].position()]
    }

    /// State of one channel
    pub fn channel_state(&self, channel: Channel) -> &UnwrapperState {
        &self.channels[channel.index()]
    }

    /// Forget both channels; the next sample becomes the new reference
    pub fn reset(&mut self) {
        log::info!("Resetting encoder channels");
        self.channels = [UnwrapperState::Uninitialized; 2];
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }
}

/// Iterator that decodes the lines of a byte stream into events
pub struct DecodingIterator<'a, R: Read> {
    lines: LineReader<R>,
    decoder: &'a mut Decoder,
}

impl<'a, R: Read> Iterator for DecodingIterator<'a, R> {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) => Some(Ok(self.decoder.process_line(&line))),
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resolution;

    fn decoder() -> Decoder {
        Decoder::new(DecoderConfig::new()).unwrap()
    }

    #[test]
    fn test_decoder_creation() {
        let decoder = decoder();
        assert_eq!(decoder.positions(), [None, None]);
        assert_eq!(decoder.stats(), &DecoderStats::default());
        assert_eq!(decoder.config().resolution.get(), 4096);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DecoderConfig::new().with_min_fields(1);
        assert!(Decoder::new(config).is_err());
    }

    #[test]
    fn test_first_line_initializes_both_channels() {
        let mut decoder = decoder();
        let event = decoder.process_line("4095,17,0\n");
        assert_eq!(event.positions(), Some([0, 0]));
        assert_eq!(decoder.positions(), [Some(0), Some(0)]);
        assert_eq!(decoder.channel_state(Channel::First).last_absolute(), Some(4095));
        assert_eq!(decoder.channel_state(Channel::Second).last_absolute(), Some(17));
    }

    #[test]
    fn test_rollovers_in_both_directions() {
        let mut decoder = decoder();
        decoder.process_line("4095,5,0");
        let event = decoder.process_line("5,4095,0");
        assert_eq!(event.positions(), Some([6, -6]));

        let stats = decoder.stats();
        assert_eq!(stats.forward_rollovers, [1, 0]);
        assert_eq!(stats.backward_rollovers, [0, 1]);
    }

    #[test]
    fn test_malformed_line_leaves_state_untouched() {
        let mut decoder = decoder();
        decoder.process_line("200,300,0");
        let before = (
            *decoder.channel_state(Channel::First),
            *decoder.channel_state(Channel::Second),
        );

        for raw in ["", "200", "200,300", "abc,300,0", "200,x,0", "\n"] {
            let event = decoder.process_line(raw);
            assert_eq!(event.positions(), None);
            assert_eq!(event.raw(), raw);
        }

        let after = (
            *decoder.channel_state(Channel::First),
            *decoder.channel_state(Channel::Second),
        );
        assert_eq!(before, after);
        assert_eq!(decoder.stats().unparsed, 6);
        assert_eq!(decoder.stats().samples, 1);
        assert_eq!(decoder.stats().lines, 7);
    }

    #[test]
    fn test_line_numbers_count_every_line() {
        let mut decoder = decoder();
        assert_eq!(decoder.process_line("junk").line_number(), 1);
        assert_eq!(decoder.process_line("1,2,3").line_number(), 2);
    }

    #[test]
    fn test_out_of_range_counted_not_rejected() {
        let config = DecoderConfig::new()
            .with_resolution(Resolution::new(100).unwrap())
            .with_out_of_range_warnings(false);
        let mut decoder = Decoder::new(config).unwrap();

        decoder.process_line("10,10,0");
        let event = decoder.process_line("30,150,0");
        assert_eq!(event.positions(), Some([20, 40]));
        assert_eq!(decoder.stats().out_of_range, 1);
    }

    #[test]
    fn test_reset() {
        let mut decoder = decoder();
        decoder.process_line("100,100,0");
        decoder.process_line("150,50,0");
        assert_eq!(decoder.positions(), [Some(50), Some(-50)]);

        decoder.reset();
        assert_eq!(decoder.positions(), [None, None]);
        let event = decoder.process_line("3000,3000,0");
        assert_eq!(event.positions(), Some([0, 0]));
    }

    #[test]
    fn test_decode_lines_in_follow_mode() {
        let mut decoder = decoder();
        let lines = LineReader::new(std::io::Cursor::new("4095,5,0\n5,4095,0\n")).follow(true);
        let events: Vec<StreamEvent> = decoder.decode_lines(lines).take(2).map(|e| e.unwrap()).collect();

        assert_eq!(events[1].positions(), Some([6, -6]));
        assert_eq!(decoder.stats().lines, 2);
    }

    #[test]
    fn test_decode_reader() {
        let mut decoder = decoder();
        let input = std::io::Cursor::new("4095,0,a\nboot ok\n5,4090,b\n");
        let events: Vec<StreamEvent> = decoder
            .decode_reader(input)
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].positions(), Some([0, 0]));
        assert_eq!(events[1].positions(), None);
        assert_eq!(events[1].raw(), "boot ok\n");
        assert_eq!(events[2].positions(), Some([6, -6]));
    }
}
