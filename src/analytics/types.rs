//! Data types produced by the daily aggregation.

use chrono::NaiveDate;
use serde::Serialize;

/// Revenue total for one calendar date present in the input.
///
/// `moving_avg_7d` is `None` until the series has a full 7-point trailing
/// window; a partial average would read as a misleading dip at the start of
/// the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenuePoint {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub moving_avg_7d: Option<f64>,
}

/// The top and bottom revenue days, at most 3 of each.
///
/// Points appear in rank order (highest revenue first among peaks, lowest
/// first among troughs). Ties keep the earlier date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtremaSet {
    pub peaks: Vec<DailyRevenuePoint>,
    pub troughs: Vec<DailyRevenuePoint>,
}

impl ExtremaSet {
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty() && self.troughs.is_empty()
    }
}
