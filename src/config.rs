//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.racechart.toml` files.

use crate::animator::RaceConfig;
use crate::source::DEFAULT_DATA_URL;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".racechart.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Colour bars with their entity colour in the terminal.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where the records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint returning the record payload.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Local JSON file used instead of the URL when set.
    #[serde(default)]
    pub input: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_seconds: default_timeout(),
            input: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Chart geometry and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of bars shown at once.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Interpolated frames per pair of dates.
    #[serde(default = "default_frames")]
    pub frames_per_interval: usize,

    /// Duration of one transition in milliseconds.
    #[serde(default = "default_duration_ms")]
    pub transition_duration_ms: u64,

    /// Width of the drawing area in pixels.
    #[serde(default = "default_width")]
    pub display_width: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            frames_per_interval: default_frames(),
            transition_duration_ms: default_duration_ms(),
            display_width: default_width(),
        }
    }
}

fn default_capacity() -> usize {
    12
}

fn default_frames() -> usize {
    2
}

fn default_duration_ms() -> u64 {
    250
}

fn default_width() -> u32 {
    600
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.url {
            self.source.url = url.clone();
            // An explicit URL wins over an input file from the config.
            self.source.input = None;
        }
        if let Some(ref input) = args.input {
            self.source.input = Some(input.display().to_string());
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(capacity) = args.capacity {
            self.chart.capacity = capacity;
        }
        if let Some(frames) = args.frames {
            self.chart.frames_per_interval = frames;
        }
        if let Some(duration) = args.duration_ms {
            self.chart.transition_duration_ms = duration;
        }
        if let Some(width) = args.width {
            self.chart.display_width = width;
        }

        if args.verbose {
            self.general.verbose = true;
        }
        if args.no_color {
            self.general.color = false;
        }
    }

    /// Check the merged settings.
    pub fn validate(&self) -> Result<()> {
        if self.chart.capacity == 0 {
            bail!("Capacity must be at least 1");
        }
        if self.chart.frames_per_interval == 0 {
            bail!("Frames per interval must be at least 1");
        }
        if self.chart.display_width == 0 {
            bail!("Display width must be at least 1");
        }
        if self.source.input.is_none()
            && !self.source.url.starts_with("http://")
            && !self.source.url.starts_with("https://")
        {
            bail!("Data URL must start with 'http://' or 'https://'");
        }
        if self.source.timeout_seconds == 0 {
            bail!("Timeout must be at least 1 second");
        }
        Ok(())
    }

    /// Log level after merging: `--quiet` wins over a verbose config.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if self.general.verbose && !args.quiet {
            tracing::Level::DEBUG
        } else {
            args.log_level()
        }
    }

    /// Settings for the animator. Headless runs use zero-length transitions.
    pub fn race_config(&self, headless: bool) -> RaceConfig {
        let transition_duration = if headless {
            Duration::ZERO
        } else {
            Duration::from_millis(self.chart.transition_duration_ms)
        };

        RaceConfig {
            capacity: self.chart.capacity,
            frames_per_interval: self.chart.frames_per_interval,
            transition_duration,
            display_width: self.chart.display_width,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
