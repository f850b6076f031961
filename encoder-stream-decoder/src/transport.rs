//! Line-oriented transport
//!
//! The decoder does not open or configure serial ports itself. It reads from
//! any byte stream: a device node prepared by the caller, a capture file, or
//! stdin. [`LineReader`] splits that stream into physical lines.
//!
//! ## Behaviour
//! - Lines end at `\n`; the terminator is kept in the yielded text
//! - A trailing line without terminator is yielded at end of stream
//! - Invalid UTF-8 is replaced, never fatal
//! - A read timeout keeps the partial line and waits for the rest
//! - In follow mode an empty read means "no data yet", not end of stream.
//!   A tty with `VMIN=0, VTIME>0` reports its read timeout that way.

use crate::types::{DecoderError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::time::Duration;

/// Pause between empty reads in follow mode
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Iterator over the lines of a byte stream
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
    follow: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(64),
            follow: false,
        }
    }

    /// Builder method: keep waiting on empty reads instead of ending the stream
    ///
    /// Only complete lines are yielded in follow mode; the stream ends on a
    /// read error.
    pub fn follow(mut self, enabled: bool) -> Self {
        self.follow = enabled;
        self
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(_) if self.buffer.ends_with(b"\n") => return Ok(Some(self.take_line())),
                Ok(_) if self.follow => {
                    log::trace!("No data yet, {} pending bytes", self.buffer.len());
                    std::thread::sleep(IDLE_BACKOFF);
                }
                Ok(0) if self.buffer.is_empty() => return Ok(None),
                Ok(_) => return Ok(Some(self.take_line())),
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    log::trace!("Read timed out with {} pending bytes", self.buffer.len());
                }
                Err(e) => return Err(DecoderError::IoError(e)),
            }
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        line
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

/// Open a serial device node (or any file) for reading and writing
///
/// Line settings (baud rate, framing) must already be applied to the device.
pub fn open_port(path: &Path) -> Result<File> {
    log::info!("Opening port: {:?}", path);

    if !path.exists() {
        return Err(DecoderError::IoError(std::io::Error::new(
            ErrorKind::NotFound,
            format!("port not found: {:?}", path),
        )));
    }

    let file = OpenOptions::new().read(true).write(true).open(path)?;
    Ok(file)
}

/// True if `path` is a character device (a tty), whose empty reads are idle gaps
#[cfg(unix)]
pub fn is_device(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;

    std::fs::metadata(path)
        .map(|m| m.file_type().is_char_device())
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_device(_path: &Path) -> bool {
    false
}
