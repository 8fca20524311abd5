//! Reporting output for aggregated results.
//!
//! Supports pretty JSON logging of the daily series and CSV export.

use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analytics::types::{DailyRevenuePoint, ExtremaSet};
use crate::error::PipelineError;

/// Summary of one aggregation run, serialized for the `summary` subcommand.
#[derive(Debug, Serialize)]
pub struct RevenueSummary<'a> {
    pub days: usize,
    pub series: &'a [DailyRevenuePoint],
    pub extrema: &'a ExtremaSet,
}

/// Logs the daily series and extrema as pretty-printed JSON.
pub fn print_json(
    series: &[DailyRevenuePoint],
    extrema: &ExtremaSet,
) -> Result<(), PipelineError> {
    let summary = RevenueSummary {
        days: series.len(),
        series,
        extrema,
    };
    let json = serde_json::to_string_pretty(&summary)?;
    info!("{json}");
    Ok(())
}

/// Appends the daily revenue points as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn export_daily_csv(path: &str, series: &[DailyRevenuePoint]) -> Result<(), PipelineError> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Exporting daily revenue CSV");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for point in series {
        writer.serialize(point)?;
    }
    writer.flush()?;

    info!(path, rows = series.len(), "Daily revenue exported");
    Ok(())
}
