//! Plotters-backed SVG chart sink.
//!
//! Draws the daily revenue line with point markers, the 7-day moving average
//! as a dashed overlay, and the peak/trough annotations above/below their
//! points. The x axis is the series position (one slot per present date)
//! with date-formatted tick labels, so gaps in the calendar do not stretch
//! the chart.

use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::render::{Direction, RenderSink, SeriesBundle};

const TITLE: &str = "Daily Total Revenue with 7-Day Moving Average";

pub struct SvgChart {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl SvgChart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 1200,
            height: 600,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl RenderSink for SvgChart {
    fn draw_series(&mut self, bundle: &SeriesBundle) -> Result<(), PipelineError> {
        let root = SVGBackend::new(&self.path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        if bundle.primary.is_empty() {
            // Degrade gracefully on an empty dataset: an empty titled chart
            // instead of a failure.
            warn!(path = %self.path.display(), "No data points, rendering empty chart");
            root.titled(TITLE, ("sans-serif", 24))
                .map_err(draw_err)?;
            root.present().map_err(|e| PipelineError::Render(e.to_string()))?;
            return Ok(());
        }

        let dates: Vec<_> = bundle.primary.iter().map(|(d, _)| *d).collect();
        let n = bundle.primary.len();

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &(_, v) in &bundle.primary {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
        // Leave headroom for the annotation text offsets.
        let pad = ((y_max - y_min) * 0.1).max(1.0);
        let y_range = (y_min - pad)..(y_max + pad);
        let x_range = -0.5..(n as f64 - 0.5);

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Total Revenue ($)")
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                let i = x.round();
                if i < 0.0 {
                    return String::new();
                }
                dates
                    .get(i as usize)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y| format!("{y:.0}"))
            .label_style(("sans-serif", 12))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(
                LineSeries::new(
                    bundle
                        .primary
                        .iter()
                        .enumerate()
                        .map(|(i, &(_, v))| (i as f64, v)),
                    &BLUE,
                )
                .point_size(3),
            )
            .map_err(draw_err)?
            .label("Daily Revenue")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        let average: Vec<(f64, f64)> = bundle
            .secondary
            .iter()
            .enumerate()
            .filter_map(|(i, &(_, v))| v.map(|v| (i as f64, v)))
            .collect();
        if !average.is_empty() {
            chart
                .draw_series(DashedLineSeries::new(
                    average.iter().copied(),
                    6,
                    4,
                    RED.stroke_width(1),
                ))
                .map_err(draw_err)?
                .label("7-Day Moving Average")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        }

        chart
            .draw_series(bundle.annotations.iter().filter_map(|a| {
                let i = dates.iter().position(|d| *d == a.date)?;
                let (color, dy) = match a.direction {
                    Direction::Peak => (GREEN, -18),
                    Direction::Trough => (RED, 10),
                };
                let text = Text::new(
                    a.label.clone(),
                    (0, dy),
                    ("sans-serif", 12).into_font().color(&color),
                );
                Some(EmptyElement::at((i as f64, a.value)) + text)
            }))
            .map_err(draw_err)?;

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(draw_err)?;

        root.present()
            .map_err(|e| PipelineError::Render(e.to_string()))?;
        info!(path = %self.path.display(), points = n, "Chart written");
        Ok(())
    }
}

fn draw_err<E: std::error::Error + Send + Sync>(
    e: DrawingAreaErrorKind<E>,
) -> PipelineError {
    PipelineError::Render(e.to_string())
}
