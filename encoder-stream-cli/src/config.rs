//! Configuration loading and parsing

use anyhow::{Context, Result};
use encoder_stream_decoder::{DecoderConfig, MotorCommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Serial device or capture file; stdin when absent
    pub port: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Output file; stdout when absent
    pub path: Option<PathBuf>,
    /// Echo every received line verbatim (text format only)
    #[serde(default)]
    pub echo_raw: bool,
    /// Print counters when the stream ends
    #[serde(default = "default_true")]
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            path: None,
            echo_raw: false,
            summary: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandsConfig {
    /// Commands written to the port before streaming starts
    #[serde(default)]
    pub startup: Vec<String>,
}

impl CommandsConfig {
    /// Parse the startup command names
    pub fn parse(&self) -> Result<Vec<MotorCommand>> {
        self.startup
            .iter()
            .map(|name| {
                name.parse::<MotorCommand>()
                    .with_context(|| format!("Invalid startup command: {:?}", name))
            })
            .collect()
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .decoder
        .validate()
        .with_context(|| format!("Invalid decoder settings in {:?}", path))?;
    config.commands.parse()?;

    Ok(config)
}
