//! Stage orchestration for the trip revenue pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> persist raw -> enrich -> persist enriched -> aggregate -> present
//!
//! Each stage completes fully before the next starts; the CLI subcommands
//! only differ in which collaborators they plug in.

use std::path::Path;

use tracing::info;

use crate::analytics::aggregate::{EXTREMA_COUNT, daily_revenue, select_extrema};
use crate::analytics::types::{DailyRevenuePoint, ExtremaSet};
use crate::error::PipelineError;
use crate::features::enrich_trips;
use crate::loader::{ColumnMap, load_trips};
use crate::render::{RenderSink, present};
use crate::store::TripStore;

/// Aggregation output of a full run.
#[derive(Debug)]
pub struct RunOutput {
    pub rows_loaded: usize,
    pub series: Vec<DailyRevenuePoint>,
    pub extrema: ExtremaSet,
}

/// Executes the full pipeline against the given store and render sink.
pub fn run(
    input: &Path,
    columns: &ColumnMap,
    store: &mut dyn TripStore,
    sink: &mut dyn RenderSink,
) -> Result<RunOutput, PipelineError> {
    let outcome = load_trips(input, columns)?;

    store.create_schema()?;
    store.bulk_insert(&outcome.trips)?;

    let enriched = enrich_trips(outcome.trips);
    store.replace_table(&enriched)?;

    let series = daily_revenue(&enriched);
    let extrema = select_extrema(&series, EXTREMA_COUNT);

    present(&series, &extrema, sink)?;

    info!(
        rows = outcome.rows_read,
        days = series.len(),
        "Pipeline complete"
    );
    Ok(RunOutput {
        rows_loaded: outcome.rows_read,
        series,
        extrema,
    })
}

/// Load + enrich + aggregate without touching a store or a chart backend.
pub fn summarize(input: &Path, columns: &ColumnMap) -> Result<RunOutput, PipelineError> {
    let outcome = load_trips(input, columns)?;
    let enriched = enrich_trips(outcome.trips);

    let series = daily_revenue(&enriched);
    let extrema = select_extrema(&series, EXTREMA_COUNT);

    Ok(RunOutput {
        rows_loaded: outcome.rows_read,
        series,
        extrema,
    })
}
