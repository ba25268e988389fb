//! racechart - animated bar chart race
//!
//! Loads dated per-entity values once, accumulates them into running
//! totals and animates the top entities in the terminal, one serialized
//! transition per interpolated frame.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (data source, bad data, config, rendering)

mod animator;
mod cli;
mod config;
mod engine;
mod error;
mod models;
mod render;
mod report;
mod source;

use animator::{prepare, Animator, RaceConfig};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{Report, ReportMetadata, RunSummary};
use render::format::{entity_color, format_number};
use render::{FanoutSink, RecordingSink, TerminalSink};
use source::{bucketize, DataSource, FileSource, HttpSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the log level, so it is loaded before logging
    // exists and its origin is reported afterwards.
    let (config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(&args));

    info!("racechart v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run_race(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .racechart.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the data source, capacity and timing.");
    Ok(())
}

/// Initialize logging at `level`.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete load, animate and report workflow.
async fn run_race(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    config.validate()?;

    let data_source = build_source(&config, !args.quiet)?;

    if args.dry_run {
        return handle_dry_run(data_source.as_ref(), &config).await;
    }

    let race_config = config.race_config(args.headless);

    println!("🏁 Starting race from {}", data_source.describe());
    println!(
        "   Top {} | {} frame(s) per interval | {}ms per transition",
        race_config.capacity,
        race_config.frames_per_interval,
        race_config.transition_duration.as_millis()
    );

    // The recorder always runs; the terminal only when drawing. The
    // terminal claims its rows on creation, so nothing is printed after.
    let recorder = Arc::new(RecordingSink::new());
    let mut sinks = FanoutSink::default();
    sinks.push(Box::new(Arc::clone(&recorder)));
    if !args.headless {
        sinks.push(Box::new(TerminalSink::stdout(
            race_config.display_width,
            race_config.capacity,
            config.general.color,
        )?));
    }
    debug!("Rendering to {} sink(s)", sinks.len());

    let mut animator = Animator::new(race_config, sinks);
    let summary = animator
        .start(data_source.as_ref())
        .await
        .context("Race did not complete")?;

    let duration = start_time.elapsed().as_secs_f64();
    let RaceConfig {
        capacity,
        frames_per_interval,
        ..
    } = *animator.config();
    // Releases the terminal before anything else is printed.
    drop(animator);

    if let Some(ref path) = args.record {
        let report = Report {
            metadata: ReportMetadata {
                source: data_source.describe(),
                generated_at: Utc::now(),
                capacity,
                frames_per_interval,
                buckets: summary.buckets,
                frames: summary.frames,
                entities: summary.entities.len(),
                duration_seconds: duration,
            },
            final_standings: summary.final_ranking.clone(),
            frames: recorder.frames(),
        };

        report::write_report(&report, path, args.json_report())?;
        info!("Report saved to {}", path.display());
    }

    print_summary(&summary, capacity, duration);
    Ok(())
}

/// Pick the data source: a local file when configured, the URL otherwise.
fn build_source(config: &Config, show_progress: bool) -> Result<Box<dyn DataSource>> {
    if let Some(ref input) = config.source.input {
        info!("Using local input: {}", input);
        return Ok(Box::new(FileSource::new(input)));
    }

    let source = HttpSource::new(
        config.source.url.clone(),
        config.source.timeout_seconds,
        show_progress,
    )?;
    Ok(Box::new(source))
}

/// Handle --dry-run: load and prepare the frames, print what would be animated.
async fn handle_dry_run(data_source: &dyn DataSource, config: &Config) -> Result<()> {
    println!("\n🔍 Dry run: loading data (no animation)...\n");

    let records = data_source.fetch_records().await?;
    let dataset = bucketize(&records)?;
    let race_config = config.race_config(true);

    let first = dataset.buckets.first().map(|b| b.date);
    let last = dataset.buckets.last().map(|b| b.date);
    let prepared = prepare(dataset, &race_config);

    println!("   Records:  {}", records.len());
    println!("   Entities: {}", prepared.entities.len());
    println!("   Dates:    {}", prepared.buckets);
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "   Range:    {} .. {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    println!("   Frames:   {}", prepared.frames.len());

    let playback_ms = prepared.frames.len() as u64 * config.chart.transition_duration_ms;
    println!("   Playback: {:.1}s", playback_ms as f64 / 1000.0);

    println!("\n✅ Dry run complete. Nothing was animated.");
    Ok(())
}

/// Print the final standings and timing.
fn print_summary(summary: &RunSummary, capacity: usize, duration: f64) {
    println!("\n📊 Race Summary:");
    println!(
        "   Dates: {} | Frames: {} | Entities: {}",
        summary.buckets,
        summary.frames,
        summary.entities.len()
    );

    for entry in summary.final_ranking.iter().take_while(|e| e.rank < capacity) {
        println!(
            "   {:>2}. {} {} ({})",
            entry.rank + 1,
            entry.entity,
            format_number(entry.value),
            entity_color(&entry.entity)
        );
    }

    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Race complete!");
}

/// Where the configuration came from.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    /// The default file exists but could not be read.
    Broken(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE)
            }
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Broken(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults, merged with the CLI.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    let (mut config, origin) = if let Some(ref config_path) = args.config {
        (
            Config::load(config_path)?,
            ConfigOrigin::Explicit(config_path.clone()),
        )
    } else {
        match Config::load_default() {
            Ok(Some(config)) => (config, ConfigOrigin::DefaultFile),
            Ok(None) => (Config::default(), ConfigOrigin::Defaults),
            Err(e) => (Config::default(), ConfigOrigin::Broken(e)),
        }
    };

    config.merge_with_args(args);
    Ok((config, origin))
}
