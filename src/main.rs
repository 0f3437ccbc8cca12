//! CLI entry point for the streetlamp density pipeline.
//!
//! Provides subcommands for computing segment lengths, joining lamp counts
//! into a density score, analyzing join coverage, and running all three in order.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use streetlamp_density::{
    analyzers::{analyzer::analyze_segments, types::ReportSummary},
    config::PipelineConfig,
    density::join_density,
    lamps::LampCountIndex,
    length::calculate_lengths,
    output::{append_summary, print_report, write_report_json},
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "streetlamp_density")]
#[command(about = "Score street segments by streetlight density", long_about = None)]
struct Cli {
    /// JSON file with pipeline paths and field names
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(flatten)]
    paths: PathOverrides,

    #[command(subcommand)]
    command: Commands,
}

/// Per-run overrides for the configured file locations.
#[derive(Args)]
struct PathOverrides {
    /// Streetlight inventory CSV
    #[arg(long, global = true)]
    lamps: Option<PathBuf>,

    /// Raw street centerline GeoJSON
    #[arg(long, global = true)]
    centerlines: Option<PathBuf>,

    /// Centerlines with segment lengths (length output, density input)
    #[arg(long, global = true)]
    with_length: Option<PathBuf>,

    /// Centerlines with streetlamp scores (density output, analysis input)
    #[arg(long, global = true)]
    with_score: Option<PathBuf>,
}

#[derive(Args)]
struct ReportArgs {
    /// Also write the full report as JSON
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,

    /// CSV file to append a summary row to
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add geodesic segment lengths to the centerline collection
    Lengths,
    /// Count lamps per segment and write streetlamp scores
    Density {
        /// Progress log interval in features (0 disables the pre-scan)
        #[arg(long)]
        progress_interval: Option<usize>,
    },
    /// Report join coverage and zero-score segments
    Analyze {
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Run lengths, density and analyze in order
    Run {
        #[command(flatten)]
        report: ReportArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/streetlamp_density.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("streetlamp_density.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, cli.paths);

    match cli.command {
        Commands::Lengths => {
            calculate_lengths(&config)?;
        }
        Commands::Density { progress_interval } => {
            if let Some(interval) = progress_interval {
                config.progress_interval = interval;
            }
            density(&config)?;
        }
        Commands::Analyze { report } => {
            analyze(&config, &report)?;
        }
        Commands::Run { report } => {
            calculate_lengths(&config)?;
            density(&config)?;
            analyze(&config, &report)?;
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut PipelineConfig, overrides: PathOverrides) {
    let paths = &mut config.paths;
    if let Some(p) = overrides.lamps {
        paths.lamps_csv = p;
    }
    if let Some(p) = overrides.centerlines {
        paths.centerlines = p;
    }
    if let Some(p) = overrides.with_length {
        paths.centerlines_with_length = p;
    }
    if let Some(p) = overrides.with_score {
        paths.centerlines_with_score = p;
    }
}

/// Counts lamps and streams the scored collection to disk.
fn density(config: &PipelineConfig) -> Result<()> {
    let index = LampCountIndex::from_path(&config.paths.lamps_csv, &config.fields.lamp_segment_id)?;
    join_density(config, &index)?;
    info!(
        output = %config.paths.centerlines_with_score.display(),
        "Density pass finished"
    );
    Ok(())
}

/// Runs the segment analysis and emits the report in each requested form.
fn analyze(config: &PipelineConfig, args: &ReportArgs) -> Result<()> {
    let report = analyze_segments(config)?;
    print_report(&report)?;

    if let Some(path) = &args.report_json {
        write_report_json(path, &report)?;
    }
    if let Some(path) = &args.history {
        append_summary(path, &ReportSummary::from(&report))?;
    }
    Ok(())
}
