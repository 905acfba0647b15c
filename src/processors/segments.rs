//! Consecutive-pair segment classification.
//!
//! Each pair of adjacent survey points forms a segment. A segment is a
//! candidate cave-level passage when it is short (horizontal distance within
//! the search radius) and nearly flat (absolute slope within the threshold).

use crate::config::LevelConfig;
use crate::core::error::{AnalysisError, Result};
use crate::core::loaders::Point3D;
use crate::core::transforms::{horizontal_distance, midpoint_elevation, slope_degrees};

/// Geometry of one consecutive point pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index of the first point of the pair in the input sequence.
    pub index: usize,
    /// Planar distance between the two points.
    pub horizontal_distance: f64,
    /// Signed slope in degrees, positive when ascending.
    pub slope_degrees: f64,
    /// Mean elevation of the two points.
    pub midpoint_elevation: f64,
}

impl Segment {
    /// Computes the segment from point `a` to point `b`.
    pub fn between(index: usize, a: &Point3D, b: &Point3D) -> Self {
        Self {
            index,
            horizontal_distance: horizontal_distance(a, b),
            slope_degrees: slope_degrees(a, b),
            midpoint_elevation: midpoint_elevation(a, b),
        }
    }
}

/// Lazily yields every consecutive-pair segment in point order.
pub fn segments(points: &[Point3D]) -> impl Iterator<Item = Segment> + '_ {
    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| Segment::between(i, &pair[0], &pair[1]))
}

/// Slope and radius thresholds deciding which segments qualify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFilter {
    pub slope_threshold_degrees: f64,
    pub radius_threshold_meters: f64,
}

impl SegmentFilter {
    pub fn new(slope_threshold_degrees: f64, radius_threshold_meters: f64) -> Self {
        Self {
            slope_threshold_degrees,
            radius_threshold_meters,
        }
    }

    pub fn from_config(config: &LevelConfig) -> Self {
        Self::new(
            config.slope_threshold_degrees,
            config.radius_threshold_meters,
        )
    }

    /// Returns true if the segment is short and flat enough to qualify.
    ///
    /// Both bounds are inclusive. Segments with NaN geometry never qualify.
    #[inline]
    pub fn accepts(&self, segment: &Segment) -> bool {
        segment.horizontal_distance <= self.radius_threshold_meters
            && segment.slope_degrees.abs() <= self.slope_threshold_degrees
    }

    /// Lazily yields the qualifying segments in point order.
    pub fn qualifying<'a>(&'a self, points: &'a [Point3D]) -> impl Iterator<Item = Segment> + 'a {
        segments(points).filter(move |s| self.accepts(s))
    }

    /// Classifies every consecutive pair, keeping qualifying segments and
    /// counting the rest.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if fewer than two points are
    /// given, since no segment can be formed.
    pub fn apply(&self, points: &[Point3D]) -> Result<FilterOutcome> {
        if points.len() < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "at least 2 points are required to form a segment, got {}",
                points.len()
            )));
        }

        let mut retained = Vec::with_capacity(points.len() - 1);
        let mut excluded_count = 0;

        for segment in segments(points) {
            if self.accepts(&segment) {
                retained.push(segment);
            } else {
                excluded_count += 1;
            }
        }

        Ok(FilterOutcome {
            retained,
            excluded_count,
        })
    }
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self::from_config(&LevelConfig::default())
    }
}

/// Result of filtering a point sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    /// Qualifying segments in point order.
    pub retained: Vec<Segment>,
    /// Number of pairs that failed the slope or radius test.
    pub excluded_count: usize,
}

impl FilterOutcome {
    #[inline]
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    /// Total number of consecutive pairs examined.
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.retained.len() + self.excluded_count
    }

    /// Sum of horizontal distances over qualifying segments.
    pub fn retained_length(&self) -> f64 {
        self.retained.iter().map(|s| s.horizontal_distance).sum()
    }
}
