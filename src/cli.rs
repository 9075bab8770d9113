//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a YAML or JSON script
//! - Overriding the config file and host platform
//! - JSON-lines output for tooling

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, InputConfig};
use crate::sync::HostPlatform;

/// Replay host edit events through a mention-aware text input
#[derive(Parser, Debug)]
#[command(
    name = "complete-mentions",
    version,
    about = "Replay host edit events through a mention-aware text input"
)]
pub struct CliArgs {
    /// Script to replay (.yaml, .yml or .json)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host platform whose event order to simulate (android or ios)
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<HostPlatform>,

    /// Initial text, overriding the script's
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Print one JSON object per step
    #[arg(long)]
    pub json: bool,
}

/// How step results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    JsonLines,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub script: PathBuf,
    pub config: Option<PathBuf>,
    pub platform: Option<HostPlatform>,
    pub initial_text: Option<String>,
    pub output: OutputFormat,
}

impl CliArgs {
    /// Convert parsed CLI args into run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        if self.script.is_dir() {
            return Err(format!(
                "Script path {} is a directory",
                self.script.display()
            ));
        }

        let output = if self.json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Human
        };

        Ok(RunConfig {
            script: self.script,
            config: self.config,
            platform: self.platform,
            initial_text: self.text,
            output,
        })
    }
}

impl RunConfig {
    /// Input config from `--config`, or the default location
    ///
    /// An explicit path must load; the default location falls back to defaults.
    pub fn input_config(&self) -> Result<InputConfig, ConfigError> {
        match &self.config {
            Some(path) => InputConfig::load_from(path),
            None => Ok(InputConfig::load()),
        }
    }
}
