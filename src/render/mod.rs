//! Chart presentation layer.
//!
//! The presenter turns the aggregated series into a render-ready bundle:
//! primary revenue points, the moving-average overlay, and labeled
//! peak/trough annotations. Actual drawing goes through the [`RenderSink`]
//! trait so the chart backend stays swappable (and testable with a recording
//! double).

pub mod chart;

pub use chart::SvgChart;

use chrono::NaiveDate;

use crate::analytics::types::{DailyRevenuePoint, ExtremaSet};
use crate::error::PipelineError;

/// Whether an annotated day is a revenue peak or trough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Peak,
    Trough,
}

/// One annotated extremum on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub date: NaiveDate,
    pub value: f64,
    pub label: String,
    pub direction: Direction,
}

/// Everything a rendering backend needs to draw the trend chart.
///
/// The secondary series carries `None` where the moving average is not yet
/// defined; sinks draw only the present values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesBundle {
    pub primary: Vec<(NaiveDate, f64)>,
    pub secondary: Vec<(NaiveDate, Option<f64>)>,
    pub annotations: Vec<Annotation>,
}

/// Rendering collaborator. The presenter decides *what* is drawn and how it
/// is labeled; the sink decides pixels.
pub trait RenderSink {
    fn draw_series(&mut self, bundle: &SeriesBundle) -> Result<(), PipelineError>;
}

/// Builds the render bundle from the aggregated series and its extrema.
///
/// Annotation labels carry the integer-rounded revenue, e.g. `Peak: 1234`.
pub fn build_bundle(series: &[DailyRevenuePoint], extrema: &ExtremaSet) -> SeriesBundle {
    let primary = series.iter().map(|p| (p.date, p.total_revenue)).collect();
    let secondary = series.iter().map(|p| (p.date, p.moving_avg_7d)).collect();

    let mut annotations = Vec::with_capacity(extrema.peaks.len() + extrema.troughs.len());
    for point in &extrema.peaks {
        annotations.push(Annotation {
            date: point.date,
            value: point.total_revenue,
            label: format!("Peak: {:.0}", point.total_revenue),
            direction: Direction::Peak,
        });
    }
    for point in &extrema.troughs {
        annotations.push(Annotation {
            date: point.date,
            value: point.total_revenue,
            label: format!("Trough: {:.0}", point.total_revenue),
            direction: Direction::Trough,
        });
    }

    SeriesBundle {
        primary,
        secondary,
        annotations,
    }
}

/// Hands the aggregation output to the rendering collaborator.
pub fn present(
    series: &[DailyRevenuePoint],
    extrema: &ExtremaSet,
    sink: &mut dyn RenderSink,
) -> Result<(), PipelineError> {
    let bundle = build_bundle(series, extrema);
    sink.draw_series(&bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate::{EXTREMA_COUNT, select_extrema};

    fn point(day: u32, revenue: f64, avg: Option<f64>) -> DailyRevenuePoint {
        DailyRevenuePoint {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            total_revenue: revenue,
            moving_avg_7d: avg,
        }
    }

    #[test]
    fn test_bundle_series_align_with_input() {
        let series = vec![point(1, 30.0, None), point(2, 5.0, Some(17.5))];
        let extrema = select_extrema(&series, EXTREMA_COUNT);
        let bundle = build_bundle(&series, &extrema);

        assert_eq!(bundle.primary.len(), 2);
        assert_eq!(bundle.primary[0].1, 30.0);
        assert_eq!(bundle.secondary[0].1, None);
        assert_eq!(bundle.secondary[1].1, Some(17.5));
    }

    #[test]
    fn test_annotation_labels_round_to_integers() {
        let series = vec![point(1, 90.4, None), point(2, 5.6, None)];
        let extrema = select_extrema(&series, EXTREMA_COUNT);
        let bundle = build_bundle(&series, &extrema);

        let peak = bundle
            .annotations
            .iter()
            .find(|a| a.direction == Direction::Peak)
            .unwrap();
        assert_eq!(peak.label, "Peak: 90");

        let trough = bundle
            .annotations
            .iter()
            .find(|a| a.direction == Direction::Trough)
            .unwrap();
        assert_eq!(trough.label, "Trough: 6");
    }

    #[test]
    fn test_annotation_counts_match_extrema() {
        let series: Vec<DailyRevenuePoint> = (1..=5)
            .map(|d| point(d, d as f64 * 10.0, None))
            .collect();
        let extrema = select_extrema(&series, EXTREMA_COUNT);
        let bundle = build_bundle(&series, &extrema);

        let peaks = bundle
            .annotations
            .iter()
            .filter(|a| a.direction == Direction::Peak)
            .count();
        let troughs = bundle
            .annotations
            .iter()
            .filter(|a| a.direction == Direction::Trough)
            .count();
        assert_eq!(peaks, 3);
        assert_eq!(troughs, 3);
    }

    #[test]
    fn test_empty_series_yields_empty_bundle() {
        let bundle = build_bundle(&[], &ExtremaSet::default());
        assert!(bundle.primary.is_empty());
        assert!(bundle.secondary.is_empty());
        assert!(bundle.annotations.is_empty());
    }

    #[test]
    fn test_present_calls_sink_once() {
        struct Recorder {
            calls: usize,
            last: Option<SeriesBundle>,
        }
        impl RenderSink for Recorder {
            fn draw_series(&mut self, bundle: &SeriesBundle) -> Result<(), PipelineError> {
                self.calls += 1;
                self.last = Some(bundle.clone());
                Ok(())
            }
        }

        let series = vec![point(1, 30.0, None)];
        let extrema = select_extrema(&series, EXTREMA_COUNT);
        let mut sink = Recorder {
            calls: 0,
            last: None,
        };
        present(&series, &extrema, &mut sink).unwrap();

        assert_eq!(sink.calls, 1);
        assert_eq!(sink.last.unwrap().primary.len(), 1);
    }
}
