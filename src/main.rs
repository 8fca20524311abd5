//! CLI entry point for the trip revenue trend tool.
//!
//! Provides subcommands for running the full ingest-to-chart pipeline and
//! for printing a quick aggregation summary without touching the store.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use trip_trends::loader::{ColumnMap, DEFAULT_TIMESTAMP_FORMAT};
use trip_trends::output::{export_daily_csv, print_json};
use trip_trends::pipeline;
use trip_trends::render::SvgChart;
use trip_trends::store::SqliteStore;

#[derive(Parser)]
#[command(name = "trip_trends")]
#[command(about = "Ingest taxi trip records and chart the daily revenue trend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Source-file column configuration, shared by all subcommands.
#[derive(Args)]
struct ColumnArgs {
    /// Header name of the pickup timestamp column
    #[arg(long, default_value = "tpep_pickup_datetime")]
    pickup_col: String,

    /// Header name of the dropoff timestamp column
    #[arg(long, default_value = "tpep_dropoff_datetime")]
    dropoff_col: String,

    /// Header name of the passenger count column
    #[arg(long, default_value = "passenger_count")]
    passengers_col: String,

    /// Header name of the trip distance column
    #[arg(long, default_value = "trip_distance")]
    distance_col: String,

    /// Header name of the fare amount column
    #[arg(long, default_value = "fare_amount")]
    fare_col: String,

    /// Header name of the tip amount column
    #[arg(long, default_value = "tip_amount")]
    tip_col: String,

    /// strftime layout of the timestamp columns
    #[arg(long, default_value = DEFAULT_TIMESTAMP_FORMAT)]
    timestamp_format: String,
}

impl ColumnArgs {
    fn to_column_map(&self) -> ColumnMap {
        ColumnMap {
            pickup: self.pickup_col.clone(),
            dropoff: self.dropoff_col.clone(),
            passenger_count: self.passengers_col.clone(),
            trip_distance: self.distance_col.clone(),
            fare_amount: self.fare_col.clone(),
            tip_amount: self.tip_col.clone(),
            timestamp_format: self.timestamp_format.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: load, persist, enrich, aggregate, chart
    Run {
        /// Path to the trip-record CSV file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// SQLite database path (falls back to TRIP_DB_PATH, then trips.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// SVG file to write the trend chart to
        #[arg(short, long, default_value = "revenue_trend.svg")]
        chart: String,

        /// Optional CSV file to append the daily revenue series to
        #[arg(long)]
        export: Option<String>,

        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Aggregate only: print the daily revenue series and extrema as JSON
    Summary {
        /// Path to the trip-record CSV file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trip_trends.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trip_trends.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            db,
            chart,
            export,
            columns,
        } => {
            let db_path = db.unwrap_or_else(|| {
                std::env::var("TRIP_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("trips.db"))
            });
            info!(input = %input.display(), db = %db_path.display(), chart = %chart, "Starting pipeline run");

            let mut store = SqliteStore::open(&db_path)?;
            let mut sink = SvgChart::new(&chart);

            let output =
                pipeline::run(&input, &columns.to_column_map(), &mut store, &mut sink)?;

            if let Some(export_path) = export {
                export_daily_csv(&export_path, &output.series)?;
            }

            info!(
                rows = output.rows_loaded,
                days = output.series.len(),
                peaks = output.extrema.peaks.len(),
                troughs = output.extrema.troughs.len(),
                "Run finished"
            );
        }
        Commands::Summary { input, columns } => {
            let output = pipeline::summarize(&input, &columns.to_column_map())?;
            print_json(&output.series, &output.extrema)?;
        }
    }

    Ok(())
}
