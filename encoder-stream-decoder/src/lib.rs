//! Encoder Stream Decoder Library
//!
//! Converts a stream of absolute rotary-encoder readings, received as text
//! lines over a serial link, into continuous incremental positions.
//!
//! # Architecture
//!
//! - [`LineParser`] decodes one line (`"<enc1>,<enc2>,<...>"`) into an absolute
//!   sample pair, or nothing for malformed input
//! - [`EncoderUnwrapper`] turns absolute samples into an unbounded position,
//!   correcting for rollover at the resolution boundary
//! - [`Decoder`] owns both channel states and emits a [`StreamEvent`] per line
//! - [`MotorCommand`] is the single-character command vocabulary of the
//!   motor controller
//!
//! The library does NOT:
//! - Open or configure serial ports (any `std::io::Read` will do)
//! - Render positions or raw lines
//! - Persist positions between runs
//!
//! All higher-level functionality is in the application layer (encoder-stream-cli).
//!
//! # Example Usage
//!
//! ```
//! use encoder_stream_decoder::{Decoder, DecoderConfig, Resolution};
//! use std::io::Cursor;
//!
//! let config = DecoderConfig::new().with_resolution(Resolution::new(4096).unwrap());
//! let mut decoder = Decoder::new(config).unwrap();
//!
//! let capture = Cursor::new("4095,10,0\n5,20,0\n");
//! for event in decoder.decode_reader(capture) {
//!     match event {
//!         Ok(event) => println!("{:?} <- {:?}", event.positions(), event.raw()),
//!         Err(e) => eprintln!("Read error: {}", e),
//!     }
//! }
//! assert_eq!(decoder.positions(), [Some(6), Some(10)]);
//! ```

// Public modules
pub mod command;
pub mod config;
pub mod decoder;
pub mod line_parser;
pub mod transport;
pub mod types;
pub mod unwrapper;

// Re-export main types for convenience
pub use command::{MotorCommand, MoveToggle};
pub use config::DecoderConfig;
pub use decoder::{Decoder, DecoderStats, DecodingIterator};
pub use line_parser::{parse_line, LineParser};
pub use transport::{open_port, LineReader};
pub use types::{
    AbsoluteSample, Channel, DecoderError, Resolution, Result, StreamEvent, Timestamp,
    DEFAULT_RESOLUTION,
};
pub use unwrapper::{EncoderUnwrapper, Rollover, UnwrapStep, UnwrapperState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a decoder
        let decoder = Decoder::new(DecoderConfig::new()).unwrap();
        assert_eq!(decoder.stats().lines, 0);
        assert!(!VERSION.is_empty());
    }
}
