//! Chart rendering for level distributions.
//!
//! Draws the elevation-class distribution as a horizontal bar chart: one bar
//! per class, classes stacked bottom-up in ascending elevation, bar length
//! along the horizontal axis.
//!
//! Plotters is built without a font backend, so the image carries no text.
//! Class labels and the value-axis label come from the series itself and are
//! printed alongside the chart by the caller.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::ChartConfig;
use crate::processors::distribution::DistributionSeries;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Empty distribution series")]
    EmptySeries,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Pixels left blank above and below each bar.
const BAR_MARGIN: u32 = 4;

/// Value-axis extent for a series whose lengths peak at `max_length`.
fn value_axis_max(max_length: f64, normalized: bool) -> f64 {
    if normalized {
        1.0
    } else if max_length > 0.0 {
        max_length * 1.05
    } else {
        1.0
    }
}

/// Plot the distribution as a horizontal bar chart and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `series` - Distribution to draw, in ascending class order
/// * `chart` - Image size and bar color
/// * `_title` - Title for the plot (unused - no font backend)
///
/// # Errors
///
/// Returns `VisualizationError::EmptySeries` for a series without classes,
/// or a plotting error if the image cannot be drawn or written.
pub fn plot_distribution(
    output_path: &Path,
    series: &DistributionSeries,
    chart: &ChartConfig,
    _title: &str,
) -> Result<()> {
    if series.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    let rows = series.len() as i32;
    let x_max = value_axis_max(series.max_length(), series.is_normalized());
    let [r, g, b] = chart.bar_color;
    let bar_color = RGBColor(r, g, b);

    let root =
        BitMapBackend::new(output_path, (chart.width, chart.height)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut ctx = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..x_max, (0..rows).into_segmented())
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    ctx.draw_series(
        Histogram::horizontal(&ctx)
            .style(bar_color.filled())
            .margin(BAR_MARGIN)
            .data(
                series
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| (i as i32, entry.length)),
            ),
    )
    .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}
