//! Standalone capture decoder
//!
//! Decodes a recorded encoder stream and prints the incremental positions of
//! both channels next to the raw lines.
//!
//! Usage:
//!   decode_capture <capture.txt> [--resolution <N>] [--limit <count>]
//!
//! Example:
//!   decode_capture dynamixel.log --resolution 4096 --limit 100

use encoder_stream_decoder::{Decoder, DecoderConfig, Resolution, StreamEvent};
use std::env;
use std::fs::File;
use std::path::PathBuf;

fn print_event(event: &StreamEvent) {
    match event {
        StreamEvent::Positions {
            line_number,
            absolute,
            positions,
            ..
        } => {
            println!(
                "[{:>6}] abs ({:>5}, {:>5})  ->  Q1={:<10} Q2={}",
                line_number, absolute[0], absolute[1], positions[0], positions[1]
            );
        }
        StreamEvent::Unparsed { line_number, raw, .. } => {
            println!("[{:>6}] (no sample) {}", line_number, raw.trim_end());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <capture.txt> [--resolution <N>] [--limit <count>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut resolution = Resolution::default();
    let mut limit: Option<usize> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--resolution" if i + 1 < args.len() => {
                resolution = Resolution::new(args[i + 1].parse()?)?;
                i += 2;
            }
            "--limit" if i + 1 < args.len() => {
                limit = Some(args[i + 1].parse()?);
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    println!("=== Encoder capture: {:?} (N = {}) ===\n", path, resolution);

    let mut decoder = Decoder::new(DecoderConfig::new().with_resolution(resolution))?;
    let file = File::open(&path)?;

    for event in decoder.decode_reader(file).take(limit.unwrap_or(usize::MAX)) {
        print_event(&event?);
    }

    let stats = decoder.stats();
    println!("\n=== SUMMARY ===");
    println!("Lines:            {}", stats.lines);
    println!("Samples:          {}", stats.samples);
    println!("Unparsed lines:   {}", stats.unparsed);
    println!("Out of range:     {}", stats.out_of_range);
    println!(
        "Rollovers Q1:     {} forward, {} backward",
        stats.forward_rollovers[0], stats.backward_rollovers[0]
    );
    println!(
        "Rollovers Q2:     {} forward, {} backward",
        stats.forward_rollovers[1], stats.backward_rollovers[1]
    );

    Ok(())
}
