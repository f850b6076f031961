//! Output sinks
//!
//! Writes positions (and optionally the raw console text) in plain text or
//! as JSON lines, plus an end-of-run summary.

use crate::config::OutputFormat;
use encoder_stream_decoder::{DecoderStats, StreamEvent};
use std::io::{self, Write};

/// Writes decoded events to a text or JSON-lines sink
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    echo_raw: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat, echo_raw: bool) -> Self {
        Self {
            out,
            format,
            echo_raw,
        }
    }

    /// Write one event
    pub fn emit(&mut self, event: &StreamEvent) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => self.emit_text(event),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)
            }
        }
    }

    fn emit_text(&mut self, event: &StreamEvent) -> io::Result<()> {
        if self.echo_raw {
            let raw = event.raw();
            self.out.write_all(raw.as_bytes())?;
            if !raw.ends_with('\n') {
                writeln!(self.out)?;
            }
        }
        if let Some([q1, q2]) = event.positions() {
            writeln!(self.out, "Q1={} Q2={}", q1, q2)?;
        }
        Ok(())
    }

    /// Write end-of-run counters and the final positions
    pub fn summary(&mut self, stats: &DecoderStats, positions: [Option<i64>; 2]) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "--- summary ---")?;
                writeln!(self.out, "lines:        {}", stats.lines)?;
                writeln!(self.out, "samples:      {}", stats.samples)?;
                writeln!(self.out, "unparsed:     {}", stats.unparsed)?;
                writeln!(self.out, "out of range: {}", stats.out_of_range)?;
                for (i, name) in ["Q1", "Q2"].iter().enumerate() {
                    let position = positions[i]
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        self.out,
                        "{}: position {}, rollovers {} forward / {} backward",
                        name, position, stats.forward_rollovers[i], stats.backward_rollovers[i]
                    )?;
                }
            }
            OutputFormat::Json => {
                let summary = serde_json::json!({
                    "kind": "summary",
                    "lines": stats.lines,
                    "samples": stats.samples,
                    "unparsed": stats.unparsed,
                    "out_of_range": stats.out_of_range,
                    "forward_rollovers": stats.forward_rollovers,
                    "backward_rollovers": stats.backward_rollovers,
                    "positions": positions,
                });
                serde_json::to_writer(&mut self.out, &summary)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
