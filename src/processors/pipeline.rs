//! End-to-end level extraction.
//!
//! Runs segment filtering, elevation banding, distribution building and
//! summary reporting in a single forward pass. The analysis is a pure
//! function of its inputs: no I/O, no shared state, and any stage failure
//! aborts the whole run.

use log::{debug, info};

use crate::config::LevelConfig;
use crate::core::error::{AnalysisError, Result};
use crate::core::loaders::Point3D;
use crate::core::transforms::{elevation_range, first_non_finite};

use super::banding::band_segments;
use super::distribution::{build_distribution, DistributionSeries};
use super::segments::SegmentFilter;
use super::summary::{summarize, ValidationSummary};

/// Output of a level analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAnalysis {
    pub series: DistributionSeries,
    pub summary: ValidationSummary,
}

/// Extracts the elevation-class distribution of near-horizontal segments.
///
/// # Errors
///
/// - `AnalysisError::Configuration` if `config` fails validation (checked
///   before any point is examined), or if the interval is so fine that the
///   elevation range would span more than `MAX_CLASSES` classes.
/// - `AnalysisError::InvalidInput` if fewer than two points are given or a
///   coordinate is not finite.
/// - `AnalysisError::DegenerateNormalization` if normalization is requested
///   and no segment qualified.
pub fn analyze_levels(points: &[Point3D], config: &LevelConfig) -> Result<LevelAnalysis> {
    config.validate()?;

    if let Some(i) = first_non_finite(points) {
        return Err(AnalysisError::InvalidInput(format!(
            "point {} has a non-finite coordinate",
            i
        )));
    }

    let interval = config.elevation_class_interval_meters;

    info!("Filtering {} point pairs...", points.len().saturating_sub(1));
    let filter = SegmentFilter::from_config(config);
    let outcome = filter.apply(points)?;
    debug!(
        "{} segments retained, {} excluded",
        outcome.retained_count(),
        outcome.excluded_count
    );

    info!("Banding segments into {} m elevation classes...", interval);
    let (z_min, z_max) = elevation_range(points).ok_or_else(|| {
        AnalysisError::InvalidInput("point sequence is empty".to_string())
    })?;
    let banded = band_segments(&outcome.retained, z_min, z_max, interval)?;
    debug!(
        "{} classes with segments, {} after gap-filling",
        banded.raw.len(),
        banded.filled.len()
    );

    info!("Building distribution...");
    let series = build_distribution(&banded.filled, config.normalize)?;

    info!("Computing validation summary...");
    let summary = summarize(points, &outcome, &banded.raw, &series);

    Ok(LevelAnalysis { series, summary })
}
