/*!
 * SVG charts of evaluation scores.
 *
 * - `ragas_boxplot.svg`: one box per metric (quartiles, 1.5 IQR whiskers,
 *   outliers as circles)
 * - `<metric>.svg`: score per question index
 *
 * Both share a y axis from 0 to 1.05 with dashed horizontal grid lines.
 */

use anyhow::{Result, anyhow};
use log::info;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use super::harness::EvalRecord;
use super::results::metric_column;
use super::scorer::Metric;
use crate::file_utils::FileManager;

const Y_MAX: f64 = 1.05;
const BOX_PLOT_SIZE: (u32, u32) = (1000, 600);
const LINE_CHART_SIZE: (u32, u32) = (1000, 400);
const BOX_HALF_WIDTH: f64 = 0.2;
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);

type Canvas<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type ScoreChart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Five-number summary with outliers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Quantile of sorted data with linear interpolation between ranks
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

impl BoxStats {
    /// `None` for an empty sample
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        // Whiskers stop at the furthest sample inside the fences, not at the fences
        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let whisker_low = inside.first().copied().unwrap_or(q1);
        let whisker_high = inside.last().copied().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Runs of consecutive scored questions as `(index, score)` points
pub fn score_segments(records: &[EvalRecord], metric: Metric) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.scores.get(metric) {
            Some(value) => current.push((idx as f64, value)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn chart_error<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("Failed to draw chart: {}", e)
}

fn grid_style() -> ShapeStyle {
    BLACK.mix(0.3).stroke_width(1)
}

/// Dashed horizontal lines every 0.2 from 0 to 1
fn draw_y_grid(chart: &mut ScoreChart<'_, '_>, x_range: (f64, f64)) -> Result<()> {
    for tick in 0..=5 {
        let y = tick as f64 * 0.2;
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_range.0, y), (x_range.1, y)],
                6,
                4,
                grid_style(),
            ))
            .map_err(chart_error)?;
    }
    Ok(())
}

fn draw_box_plot(root: &Canvas<'_>, records: &[EvalRecord]) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let x_range = (-0.5, Metric::ALL.len() as f64 - 0.5);
    let mut chart = ChartBuilder::on(root)
        .caption("RAG Evaluation", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, 0f64..Y_MAX)
        .map_err(chart_error)?;

    let metric_label = |x: &f64| -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        Metric::ALL
            .get(idx as usize)
            .map(|m| m.name().to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(Metric::ALL.len())
        .x_label_formatter(&metric_label)
        .y_labels(6)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .y_desc("Score")
        .draw()
        .map_err(chart_error)?;
    draw_y_grid(&mut chart, x_range)?;

    for (idx, metric) in Metric::ALL.iter().enumerate() {
        let Some(stats) = BoxStats::from_values(&metric_column(records, *metric)) else {
            continue;
        };
        let x = idx as f64;
        let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
        let cap = BOX_HALF_WIDTH / 2.0;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(left, stats.q1), (right, stats.q3)],
                BLACK.stroke_width(1),
            )))
            .map_err(chart_error)?;
        chart
            .draw_series(
                [
                    vec![(x, stats.whisker_low), (x, stats.q1)],
                    vec![(x, stats.q3), (x, stats.whisker_high)],
                    vec![(x - cap, stats.whisker_low), (x + cap, stats.whisker_low)],
                    vec![(x - cap, stats.whisker_high), (x + cap, stats.whisker_high)],
                ]
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.stroke_width(1))),
            )
            .map_err(chart_error)?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(left, stats.median), (right, stats.median)],
                MEDIAN_COLOR.stroke_width(2),
            )))
            .map_err(chart_error)?;
        chart
            .draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|value| Circle::new((x, *value), 4, BLACK.stroke_width(1))),
            )
            .map_err(chart_error)?;
    }

    Ok(())
}

fn draw_line_chart(root: &Canvas<'_>, records: &[EvalRecord], metric: Metric) -> Result<()> {
    root.fill(&WHITE).map_err(chart_error)?;

    let x_range = (0.0, records.len().saturating_sub(1).max(1) as f64);
    let mut chart = ChartBuilder::on(root)
        .caption(metric.name(), ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.0..x_range.1, 0f64..Y_MAX)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(10)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_labels(6)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .x_desc("Question index")
        .y_desc(metric.name())
        .draw()
        .map_err(chart_error)?;
    draw_y_grid(&mut chart, x_range)?;

    for segment in score_segments(records, metric) {
        if segment.len() > 1 {
            chart
                .draw_series(LineSeries::new(segment.iter().copied(), LINE_COLOR.stroke_width(2)))
                .map_err(chart_error)?;
        }
        chart
            .draw_series(segment.iter().map(|point| Circle::new(*point, 4, LINE_COLOR.filled())))
            .map_err(chart_error)?;
    }

    Ok(())
}

/// Box plot of the four metrics as an SVG document
pub fn render_box_plot(records: &[EvalRecord]) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, BOX_PLOT_SIZE).into_drawing_area();
        draw_box_plot(&root, records)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Score per question index for one metric; missing scores break the line
pub fn render_line_chart(records: &[EvalRecord], metric: Metric) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, LINE_CHART_SIZE).into_drawing_area();
        draw_line_chart(&root, records, metric)?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Write the box plot and the per-metric line charts into `dir`
pub fn write_charts<P: AsRef<Path>>(dir: P, records: &[EvalRecord]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    FileManager::ensure_dir(dir)?;

    let mut written = Vec::new();
    let box_path = dir.join("ragas_boxplot.svg");
    FileManager::write_to_file(&box_path, &render_box_plot(records)?)?;
    info!("Saved boxplot in {:?}.", dir);
    written.push(box_path);

    for metric in Metric::ALL {
        let path = dir.join(format!("{}.svg", metric.name()));
        FileManager::write_to_file(&path, &render_line_chart(records, metric)?)?;
        written.push(path);
    }
    info!("Saved line plots in {:?}.", dir);

    Ok(written)
}
