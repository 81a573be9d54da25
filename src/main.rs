//! CLI entry point for the shapes.txt analyser.
//!
//! Provides subcommands for flagging shapes with sparse points, writing a
//! shapes.txt with reconstructed distances, and listing shapes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shapes_analyser::analyzers::analyzer::{AnalysisOptions, analyze_shapes};
use shapes_analyser::analyzers::types::FailureRecord;
use shapes_analyser::analyzers::units::{DistanceUnit, UnitSetting};
use shapes_analyser::config::AnalysisConfig;
use shapes_analyser::model::Dataset;
use shapes_analyser::{
    output::{append_record, print_json, print_pretty, write_records, write_shapes},
    parser::parse_shapes,
    stats::DatasetStats,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "shapes_analyser")]
#[command(about = "A tool to analyze GTFS shapes.txt files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flag shapes whose mean distance between points exceeds a threshold
    Analyze {
        /// Path to shapes.txt
        #[arg(value_name = "FILE")]
        source: String,

        /// Flagging threshold, in --threshold-unit [default: 100]
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Unit of the threshold [default: m]
        #[arg(long, value_enum)]
        threshold_unit: Option<DistanceUnit>,

        /// Unit of shape_dist_traveled in the file [default: auto]
        #[arg(short, long, value_enum)]
        unit: Option<UnitSetting>,

        /// JSON file with analysis settings; flags take precedence
        #[arg(short, long)]
        config: Option<String>,

        /// CSV file to append the run summary to
        #[arg(short, long, default_value = "data.csv")]
        output: String,

        /// CSV file for flagged shapes
        #[arg(long, default_value = "flagged.csv")]
        flagged_output: String,

        /// Optional: CSV file for the mean distance of every shape
        #[arg(long)]
        means_output: Option<String>,

        /// Optional: CSV file for excluded and failed shapes
        #[arg(long)]
        rejected_output: Option<String>,

        /// Log the summary and flagged shapes as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write a copy of shapes.txt with shape_dist_traveled filled in (meters)
    Reconstruct {
        /// Path to shapes.txt
        #[arg(value_name = "FILE")]
        source: String,

        /// Output file
        #[arg(short, long, default_value = "shapes_with_distances.txt")]
        output: String,

        /// Unit of shape_dist_traveled in the file [default: auto]
        #[arg(short, long, value_enum)]
        unit: Option<UnitSetting>,

        /// Recompute distances even where the file provides all of them
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List shapes with their point count, length and center
    ListShapes {
        /// Path to shapes.txt
        #[arg(value_name = "FILE")]
        source: String,

        /// Only show these shape ids, separated by spaces
        #[arg(long)]
        ids: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/shapes_analyser.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("shapes_analyser.log"));

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

    match cli.command {
        Commands::Analyze {
            source,
            threshold,
            threshold_unit,
            unit,
            config,
            output,
            flagged_output,
            means_output,
            rejected_output,
            json,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::load(&path)?,
                None => AnalysisConfig::default(),
            }
            .merge(threshold, threshold_unit, unit);

            let dataset = load_dataset(&source)?;
            let provided: Vec<f64> = dataset.provided_distances().collect();
            let options = config.options(&provided)?;
            info!(
                threshold = config.threshold,
                threshold_unit = %config.threshold_unit,
                threshold_m = options.threshold_m,
                data_unit = %options.data_unit,
                inferred = config.data_unit == UnitSetting::Auto,
                "Analysis settings"
            );

            let analysis = analyze_shapes(&dataset, &options);
            let stats =
                DatasetStats::from_analysis(&dataset, &analysis, options.data_unit, options.threshold_m)
                    .with_source(&source);

            if analysis.flagged().is_empty() {
                info!("No shape flagged");
            }
            for flagged in analysis.flagged() {
                info!(
                    shape_id = %flagged.shape_id,
                    mean_distance_m = flagged.mean_distance,
                    points = flagged.point_count,
                    "Shape flagged"
                );
            }

            write_records(&flagged_output, analysis.flagged())?;
            if let Some(path) = means_output {
                write_records(&path, analysis.all_means())?;
            }
            if let Some(path) = rejected_output {
                let excluded = analysis.excluded.iter().map(FailureRecord::from);
                let failed = analysis.failures.iter().map(FailureRecord::from);
                write_records(&path, excluded.chain(failed))?;
            }

            print_pretty(&stats);
            if json {
                print_json(&stats)?;
                print_json(&analysis.flagged())?;
            }
            append_record(&output, &stats)?;

            info!(
                shapes = stats.total_shapes,
                flagged = stats.flagged,
                flagged_pct = stats.flagged_pct(),
                excluded = stats.excluded,
                failed = stats.failed,
                "Analysis summary"
            );
        }
        Commands::Reconstruct {
            source,
            output,
            unit,
            force,
        } => {
            let dataset = load_dataset(&source)?;
            let provided: Vec<f64> = dataset.provided_distances().collect();
            let options = AnalysisOptions {
                data_unit: unit.unwrap_or_default().resolve(&provided),
                force_reconstruct: force,
                ..Default::default()
            };

            let analysis = analyze_shapes(&dataset, &options);
            for excluded in &analysis.excluded {
                warn!(
                    shape_id = %excluded.shape_id,
                    missing = excluded.missing_distances,
                    total = excluded.total_points,
                    "Shape left out of export"
                );
            }

            let rows = write_shapes(&output, &analysis.polylines)?;
            info!(
                output = %output,
                rows,
                shapes = analysis.polylines.len(),
                skipped = analysis.excluded.len() + analysis.failures.len(),
                "Wrote shapes with distances"
            );
        }
        Commands::ListShapes { source, ids } => {
            let dataset = load_dataset(&source)?;
            list_shapes(&dataset, ids.as_deref());
        }
    }

    Ok(())
}

/// Reads and groups a shapes.txt file.
#[tracing::instrument(fields(source = %path))]
fn load_dataset(path: &str) -> Result<Dataset> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {path}"))?;
    let rows = parse_shapes(&bytes)?;
    let dataset = Dataset::from_rows(&rows);
    info!(rows = rows.len(), shapes = dataset.len(), "Loaded shapes");
    Ok(dataset)
}

/// Logs one line per shape, or per requested id when `ids` is given.
fn list_shapes(dataset: &Dataset, ids: Option<&str>) {
    let (summaries, unknown) = dataset.summaries(ids);
    for id in &unknown {
        warn!(shape_id = %id, "Unknown shape id");
    }

    for summary in &summaries {
        let (center_lat, center_lon) = summary.center.unwrap_or_default();
        info!(
            shape_id = %summary.shape_id,
            points = summary.points,
            incomplete_points = summary.incomplete_points,
            length_m = summary.length_m,
            center_lat,
            center_lon,
            "Shape"
        );
    }

    info!(
        total = dataset.len(),
        listed = summaries.len(),
        unknown = unknown.len(),
        "Shape list summary"
    );
}
