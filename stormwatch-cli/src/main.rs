//! Stormwatch CLI - weather and typhoon risk reports from the command line

// Global invariants enforced:
// - Reports go to stdout, logs and notices to stderr
// - Identical input files and --at yield byte-for-byte identical output

use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use stormwatch_core::config::{self, EngineSettings};
use stormwatch_core::engine::Clock;
use stormwatch_core::{
    render_json, render_json_all, render_text, AnalysisReport, CycloneSnapshot, Observation,
    RiskEngine, SystemClock, WeatherSnapshot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stormwatch")]
#[command(about = "Rule-based weather and typhoon risk reports for barangay-level preparedness")]
#[command(version = env!("STORMWATCH_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single weather snapshot
    Analyze {
        /// Path to a JSON weather snapshot
        snapshot: PathBuf,

        /// Path to a JSON array of active cyclones; the closest one is analyzed
        #[arg(long)]
        cyclones: Option<PathBuf>,

        /// Location label for the report (overrides config file)
        #[arg(long)]
        location: Option<String>,

        /// Analysis time as RFC 3339 (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay a timestamped observation series through one engine
    Replay {
        /// Path to a JSON array of timestamped observations
        series: PathBuf,

        /// Location label for the reports (overrides config file)
        #[arg(long)]
        location: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print every report instead of only the last
        #[arg(long)]
        all: bool,
    },
    /// Validate or inspect a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            snapshot,
            cyclones,
            location,
            at,
            format,
            config: config_path,
        } => {
            let settings = load_settings(config_path.as_deref())?;
            let location = location.unwrap_or_else(|| settings.location.clone());
            let timestamp = match at {
                Some(ref raw) => DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("invalid --at timestamp: {}", raw))?,
                None => SystemClock.now(),
            };

            let snapshot: WeatherSnapshot = read_json(&snapshot)?;
            let cyclones: Vec<CycloneSnapshot> = match cyclones {
                Some(ref path) => read_json(path)?,
                None => Vec::new(),
            };

            let mut engine = RiskEngine::with_settings(settings);
            let mut reports = vec![engine.analyze_general_weather_at(&snapshot, &location, timestamp)];
            reports.extend(engine.analyze_active_cyclones_at(&cyclones, &snapshot, &location, timestamp));

            print_reports(&reports, format);
        }
        Commands::Replay {
            series,
            location,
            format,
            config: config_path,
            all,
        } => {
            let settings = load_settings(config_path.as_deref())?;
            let location = location.unwrap_or_else(|| settings.location.clone());
            let observations: Vec<Observation> = read_json(&series)?;
            if observations.is_empty() {
                anyhow::bail!("series is empty: {}", series.display());
            }

            let mut engine = RiskEngine::with_settings(settings);
            let mut reports: Vec<AnalysisReport> = observations
                .iter()
                .map(|obs| engine.analyze_general_weather_at(&obs.snapshot(), &location, obs.timestamp))
                .collect();
            tracing::info!(
                observations = observations.len(),
                anomalies = engine.memory().anomalies().len(),
                "replay complete"
            );

            if !all {
                reports = reports.split_off(reports.len() - 1);
            }
            print_reports(&reports, format);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref());

                match resolved {
                    Ok(settings) => {
                        if let Some(ref p) = settings.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let settings = config::load_and_resolve(&root, path.as_deref())
                    .context("failed to load configuration")?;
                print_settings(&settings);
            }
        },
    }

    Ok(())
}

fn load_settings(config_path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    let root = std::env::current_dir()?;
    let settings =
        config::load_and_resolve(&root, config_path).context("failed to load configuration")?;
    if let Some(ref path) = settings.config_path {
        eprintln!("Using config: {}", path.display());
    }
    Ok(settings)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_reports(reports: &[AnalysisReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => match reports {
            [single] => println!("{}", render_json(single)),
            _ => println!("{}", render_json_all(reports)),
        },
        OutputFormat::Text => {
            let blocks: Vec<String> = reports.iter().map(render_text).collect();
            print!("{}", blocks.join("\n"));
        }
    }
}

fn print_settings(settings: &EngineSettings) {
    println!("Configuration:");
    match settings.config_path {
        Some(ref p) => println!("  Source: {}", p.display()),
        None => println!("  Source: defaults"),
    }
    println!("  Location: {}", settings.location);
    println!("  Memory capacity: {}", settings.memory_capacity);
    println!("  Trend window: {}", settings.trend_window);
    println!("  Thresholds:");
    println!("    Low:      {}", settings.thresholds.low);
    println!("    Moderate: {}", settings.thresholds.moderate);
    println!("    High:     {}", settings.thresholds.high);
    println!("    Critical: {}", settings.thresholds.critical);
}

fn init_tracing() {
    // Determine if we should use colors
    let use_color = match std::env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to STORMWATCH_LOG
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("STORMWATCH_LOG").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
