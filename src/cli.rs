//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// racechart - animated bar chart race in the terminal
///
/// Loads dated per-entity values, accumulates them into running totals
/// and animates the top entities frame by frame.
///
/// Examples:
///   racechart
///   racechart --input counter.json --capacity 8
///   racechart --headless --record race.json --format json
///   racechart --dry-run
///   racechart --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Endpoint to fetch the records from
    ///
    /// Defaults to the value in .racechart.toml, then to the public counter API.
    #[arg(short, long, value_name = "URL", env = "RACECHART_URL", conflicts_with = "input")]
    pub url: Option<String>,

    /// Local JSON file to read the records from instead of a URL
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .racechart.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of bars shown at once
    #[arg(short = 'k', long, value_name = "COUNT")]
    pub capacity: Option<usize>,

    /// Interpolated frames per pair of dates
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<usize>,

    /// Duration of one transition in milliseconds
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Width of the drawing area in pixels
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write a report of the run to this file
    #[arg(short, long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Load and prepare the data, print a summary and exit without animating
    #[arg(long)]
    pub dry_run: bool,

    /// Record frames without drawing; transitions take no time
    #[arg(long)]
    pub headless: bool,

    /// Draw bars without ANSI colours
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .racechart.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// Values that can also come from the config file are checked again
    /// after merging, see `Config::validate`.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Data URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.capacity == Some(0) {
            return Err("Capacity must be at least 1".to_string());
        }
        if self.frames == Some(0) {
            return Err("Frames per interval must be at least 1".to_string());
        }
        if self.width == Some(0) {
            return Err("Width must be at least 1".to_string());
        }
        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Returns true when the json report format was chosen.
    pub fn json_report(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
