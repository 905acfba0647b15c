//! Validation statistics for a level analysis.

use serde::Serialize;

use crate::core::loaders::Point3D;
use crate::core::transforms::elevation_range;

use super::banding::{ClassAccumulator, ClassRange};
use super::distribution::DistributionSeries;
use super::segments::FilterOutcome;

/// Figures that let a surveyor sanity-check an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total_points: usize,
    pub elevation_min: f64,
    pub elevation_max: f64,
    /// Sum of the final series lengths (normalized if the series is).
    pub total_extent: f64,
    pub normalized: bool,
    pub retained_count: usize,
    pub excluded_count: usize,
    /// Classes of the elevation range that received no qualifying segment.
    pub missing_classes: Vec<String>,
}

impl ValidationSummary {
    /// Elevation range as `"min - max meters"` with two decimals.
    pub fn elevation_range_display(&self) -> String {
        format!(
            "{:.2} - {:.2} meters",
            self.elevation_min, self.elevation_max
        )
    }

    /// Key/value pairs in report order.
    pub fn items(&self) -> Vec<(&'static str, String)> {
        let missing = if self.missing_classes.is_empty() {
            "none".to_string()
        } else {
            self.missing_classes.join(", ")
        };

        vec![
            ("Total points", self.total_points.to_string()),
            ("Elevation range", self.elevation_range_display()),
            ("Total extent", format!("{:.2}", self.total_extent)),
            ("Retained segments", self.retained_count.to_string()),
            ("Excluded segments", self.excluded_count.to_string()),
            ("Empty classes", missing),
        ]
    }

    /// Human-readable report, one line per figure.
    pub fn report_lines(&self) -> Vec<String> {
        self.items()
            .into_iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect()
    }
}

/// Derives the validation summary.
///
/// `raw` must be the accumulator before gap-filling; the empty-class list is
/// recomputed from the full point elevation range against it.
pub fn summarize(
    points: &[Point3D],
    outcome: &FilterOutcome,
    raw: &ClassAccumulator,
    series: &DistributionSeries,
) -> ValidationSummary {
    let (elevation_min, elevation_max, missing_classes) = match elevation_range(points) {
        Some((z_min, z_max)) => {
            let range = ClassRange::spanning(z_min, z_max, raw.interval());
            let missing: Vec<String> =
                raw.missing_from(&range).iter().map(|c| c.label()).collect();
            (z_min, z_max, missing)
        }
        None => (0.0, 0.0, Vec::new()),
    };

    ValidationSummary {
        total_points: points.len(),
        elevation_min,
        elevation_max,
        total_extent: series.total_length(),
        normalized: series.is_normalized(),
        retained_count: outcome.retained_count(),
        excluded_count: outcome.excluded_count,
        missing_classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::distribution::build_distribution;
    use crate::processors::segments::SegmentFilter;

    fn survey() -> Vec<Point3D> {
        vec![
            Point3D::new(0.0, 0.0, 2.0),
            Point3D::new(20.0, 0.0, 3.0),
            Point3D::new(20.0, 0.0, 28.0),
            Point3D::new(30.0, 0.0, 27.456),
        ]
    }

    #[test]
    fn test_summarize_counts_and_range() {
        let points = survey();
        let outcome = SegmentFilter::default().apply(&points).unwrap();
        let raw = ClassAccumulator::from_segments(&outcome.retained, 10.0);
        let series = build_distribution(&raw, false).unwrap();

        let summary = summarize(&points, &outcome, &raw, &series);
        assert_eq!(summary.total_points, 4);
        assert_eq!(summary.retained_count, 2);
        assert_eq!(summary.excluded_count, 1);
        assert_eq!(summary.elevation_min, 2.0);
        assert_eq!(summary.elevation_max, 28.0);
        assert_eq!(summary.missing_classes, vec!["10-20m".to_string()]);
        assert!((summary.total_extent - outcome.retained_length()).abs() < 1e-9);
    }

    #[test]
    fn test_report_lines_format() {
        let summary = ValidationSummary {
            total_points: 3,
            elevation_min: 0.0,
            elevation_max: 5.0,
            total_extent: 50.0,
            normalized: false,
            retained_count: 1,
            excluded_count: 1,
            missing_classes: Vec::new(),
        };

        let lines = summary.report_lines();
        assert_eq!(lines[0], "Total points: 3");
        assert_eq!(lines[1], "Elevation range: 0.00 - 5.00 meters");
        assert_eq!(lines[2], "Total extent: 50.00");
        assert_eq!(lines[4], "Excluded segments: 1");
        assert_eq!(lines[5], "Empty classes: none");
    }

    #[test]
    fn test_summarize_empty_points() {
        let raw = ClassAccumulator::new(10.0);
        let series = build_distribution(&raw, false).unwrap();
        let summary = summarize(&[], &FilterOutcome::default(), &raw, &series);
        assert_eq!(summary.total_points, 0);
        assert!(summary.missing_classes.is_empty());
    }
}
