//! Encoder Stream Monitor CLI Application
//!
//! This is the command-line interface for the encoder stream decoder.
//! It uses the encoder-stream-decoder library and adds:
//! - Port / capture file / stdin selection
//! - Motor mode commands sent before streaming
//! - TOML configuration with command-line overrides
//! - Text and JSON-lines output with an end-of-run summary

use anyhow::{bail, Context, Result};
use clap::Parser;
use encoder_stream_decoder::transport::is_device;
use encoder_stream_decoder::{open_port, Decoder, LineReader, MotorCommand, Resolution};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};
use report::Reporter;

/// Encoder Stream Monitor - Convert absolute encoder streams to incremental positions
#[derive(Parser, Debug)]
#[command(name = "encoder-stream-cli")]
#[command(about = "Convert absolute encoder readings from a serial stream into incremental positions", long_about = None)]
#[command(version)]
struct Args {
    /// Serial device or capture file to read ("-" for stdin)
    #[arg(short, long, value_name = "PORT")]
    port: Option<PathBuf>,

    /// Encoder resolution in counts per revolution (default: 4096)
    #[arg(short, long, value_name = "COUNTS", allow_negative_numbers = true)]
    resolution: Option<i64>,

    /// Motor command to send before streaming (can be repeated)
    ///
    /// Only the mode vocabulary is accepted: M (move), S (stop), V (velocity),
    /// P (position), F (free-drive), or those names. Free text is not sent.
    #[arg(short, long = "send", value_name = "COMMAND")]
    send: Vec<MotorCommand>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Echo every received line verbatim
    #[arg(short, long)]
    echo: bool,

    /// Do not print the end-of-run summary
    #[arg(long)]
    no_summary: bool,

    /// Output file for positions (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many lines
    #[arg(long, value_name = "COUNT")]
    max_lines: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Encoder Stream Monitor v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", encoder_stream_decoder::VERSION);

    let (config, commands) = resolve_config(&args)?;
    run(&config, &commands, args.max_lines)
}

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &Args) -> Result<(AppConfig, Vec<MotorCommand>)> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(port) = &args.port {
        config.input.port = Some(port.clone());
    }
    if let Some(counts) = args.resolution {
        config.decoder.resolution =
            Resolution::new(counts).context("Invalid --resolution")?;
    }
    if let Some(output) = &args.output {
        config.output.path = Some(output.clone());
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.echo {
        config.output.echo_raw = true;
    }
    if args.no_summary {
        config.output.summary = false;
    }

    // Startup commands from the file, then the ones given on the command line
    let mut commands = config.commands.parse()?;
    commands.extend(args.send.iter().copied());

    Ok((config, commands))
}

/// Open the input, send commands, then decode until the stream ends
fn run(config: &AppConfig, commands: &[MotorCommand], max_lines: Option<usize>) -> Result<()> {
    let mut decoder = Decoder::new(config.decoder.clone())?;

    let mut follow = false;
    let input: Box<dyn Read> = match config.input.port.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            // A tty read timeout is an empty read, not end of stream
            follow = is_device(path);
            let mut port = open_port(path)
                .with_context(|| format!("Failed to open port: {:?}", path))?;
            for command in commands {
                log::info!("Sending command {}", command);
                command
                    .send(&mut port)
                    .with_context(|| format!("Failed to send command {}", command))?;
            }
            Box::new(port)
        }
        _ => {
            if !commands.is_empty() {
                bail!("Motor commands need a port; stdin is read-only");
            }
            log::info!("Reading from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let out: Box<dyn Write> = match &config.output.path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut reporter = Reporter::new(out, config.output.format, config.output.echo_raw);

    // The limit applies before a line is read, so every decoded line is emitted
    let limit = max_lines.unwrap_or(usize::MAX);
    let lines = LineReader::new(input).follow(follow);
    for event in decoder.decode_lines(lines).take(limit) {
        let event = event.context("Failed to read from port")?;
        reporter.emit(&event).context("Failed to write output")?;
    }
    reporter.flush()?;
    if max_lines.is_some_and(|max| decoder.stats().lines >= max as u64) {
        log::info!("Reached line limit ({})", limit);
    }

    let stats = decoder.stats();
    log::info!(
        "Stream ended: {} lines, {} samples, {} unparsed",
        stats.lines,
        stats.samples,
        stats.unparsed
    );
    if config.output.summary {
        reporter.summary(stats, decoder.positions())?;
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "encoder-stream-cli",
            "--port",
            "/dev/ttyACM0",
            "-r",
            "1024",
            "--send",
            "P",
            "-s",
            "move",
            "--format",
            "json",
            "--echo",
            "--no-summary",
        ]);
        let (config, commands) = resolve_config(&args).unwrap();

        assert_eq!(config.input.port, Some(PathBuf::from("/dev/ttyACM0")));
        assert_eq!(config.decoder.resolution.get(), 1024);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.echo_raw);
        assert!(!config.output.summary);
        assert_eq!(commands, vec![MotorCommand::Position, MotorCommand::Move]);
    }

    #[test]
    fn test_invalid_resolution_flag() {
        let args = Args::parse_from(["encoder-stream-cli", "-r", "0"]);
        assert!(resolve_config(&args).is_err());

        let args = Args::parse_from(["encoder-stream-cli", "-r", "-5"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_unknown_command_flag() {
        assert!(Args::try_parse_from(["encoder-stream-cli", "--send", "Q"]).is_err());
    }

    #[test]
    fn test_send_help_names_the_vocabulary() {
        use clap::CommandFactory;

        let command = Args::command();
        let send = command
            .get_arguments()
            .find(|arg| arg.get_id() == "send")
            .unwrap();
        let help = send.get_long_help().unwrap().to_string();
        assert!(help.contains("Only the mode vocabulary is accepted"));
        assert!(help.contains("Free text is not sent"));
        assert!(Args::try_parse_from(["encoder-stream-cli", "--send", "hello motor"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[decoder]\nresolution = 360\n[output]\nformat = \"json\"\n[commands]\nstartup = [\"V\"]"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["encoder-stream-cli", "-c", &path, "-s", "M", "-f", "text"]);
        let (config, commands) = resolve_config(&args).unwrap();

        assert_eq!(config.decoder.resolution.get(), 360);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(commands, vec![MotorCommand::Velocity, MotorCommand::Move]);
    }

    #[test]
    fn test_run_on_capture_file() {
        let mut capture = tempfile::NamedTempFile::new().unwrap();
        write!(capture, "4095,5,0\nnoise\n5,4095,0\n").unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();

        let mut config = AppConfig::default();
        config.input.port = Some(capture.path().to_path_buf());
        config.output.path = Some(output.path().to_path_buf());
        config.output.summary = false;

        run(&config, &[], None).unwrap();
        let written = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(written, "Q1=0 Q2=0\nQ1=6 Q2=-6\n");
    }

    #[test]
    fn test_run_respects_max_lines() {
        let mut capture = tempfile::NamedTempFile::new().unwrap();
        write!(capture, "100,100,0\n110,90,0\n120,80,0\n").unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();

        let mut config = AppConfig::default();
        config.input.port = Some(capture.path().to_path_buf());
        config.output.path = Some(output.path().to_path_buf());
        config.output.summary = false;

        run(&config, &[], Some(2)).unwrap();
        let written = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(written, "Q1=0 Q2=0\nQ1=10 Q2=-10\n");
    }

    #[test]
    fn test_max_lines_summary_excludes_unread_lines() {
        // The third line would roll both channels backward if it were decoded
        let mut capture = tempfile::NamedTempFile::new().unwrap();
        write!(capture, "100,100,0\n110,90,0\n3000,3000,0\n").unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();

        let mut config = AppConfig::default();
        config.input.port = Some(capture.path().to_path_buf());
        config.output.path = Some(output.path().to_path_buf());

        run(&config, &[], Some(2)).unwrap();
        let written = std::fs::read_to_string(output.path()).unwrap();
        assert!(written.starts_with("Q1=0 Q2=0\nQ1=10 Q2=-10\n--- summary ---\n"));
        assert!(written.contains("lines:        2\n"));
        assert!(written.contains("samples:      2\n"));
        assert!(written.contains("Q1: position 10, rollovers 0 forward / 0 backward"));
        assert!(written.contains("Q2: position -10, rollovers 0 forward / 0 backward"));
    }

    #[test]
    fn test_commands_rejected_on_stdin() {
        let config = AppConfig::default();
        assert!(run(&config, &[MotorCommand::Move], None).is_err());
    }
}
