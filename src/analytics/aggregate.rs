//! Daily revenue aggregation, trailing mean, and extrema selection.
//!
//! All pure functions over ordered dated values; no store or rendering
//! dependencies, so every policy here is directly unit-testable.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::analytics::types::{DailyRevenuePoint, ExtremaSet};
use crate::trip::EnrichedTripRecord;

/// Number of series points in the trailing revenue window.
pub const MOVING_AVG_WINDOW: usize = 7;

/// How many peak and trough days to select.
pub const EXTREMA_COUNT: usize = 3;

/// Groups trips by pickup calendar date and sums fares, returning the series
/// in ascending date order with the trailing moving average filled in.
///
/// Trips with a null pickup timestamp have no date to land on and are
/// skipped; null fares are skipped within their date (the date still appears
/// if any trip fell on it). Dates with no trips at all do not appear as
/// zero-revenue points.
pub fn daily_revenue(trips: &[EnrichedTripRecord]) -> Vec<DailyRevenuePoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for trip in trips {
        let Some(pickup) = trip.trip.pickup_ts else {
            continue;
        };
        let entry = by_date.entry(pickup.date()).or_insert(0.0);
        if let Some(fare) = trip.trip.fare_amount {
            *entry += fare;
        }
    }

    let revenues: Vec<f64> = by_date.values().copied().collect();
    let averages = trailing_mean(&revenues, MOVING_AVG_WINDOW);

    let series: Vec<DailyRevenuePoint> = by_date
        .into_iter()
        .zip(averages)
        .map(|((date, total_revenue), moving_avg_7d)| DailyRevenuePoint {
            date,
            total_revenue,
            moving_avg_7d,
        })
        .collect();

    info!(days = series.len(), "Daily revenue aggregated");
    series
}

/// Trailing mean over the `window` most recent points of an ordered series.
///
/// The average is `None` until a full window exists; the window slides over
/// the series positions, not calendar time, so gaps in the underlying dates
/// do not consume slots.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Selects the top and bottom `count` days by total revenue.
///
/// Rank ties are broken by the original ascending-date order (first-seen
/// wins); a series shorter than `count` yields as many as exist.
pub fn select_extrema(series: &[DailyRevenuePoint], count: usize) -> ExtremaSet {
    let mut peaks: Vec<DailyRevenuePoint> = series.to_vec();
    // Stable sort keeps ascending-date order within equal revenues.
    peaks.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    peaks.truncate(count);

    let mut troughs: Vec<DailyRevenuePoint> = series.to_vec();
    troughs.sort_by(|a, b| a.total_revenue.total_cmp(&b.total_revenue));
    troughs.truncate(count);

    ExtremaSet { peaks, troughs }
}
