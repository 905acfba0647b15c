//! Elevation banding of qualifying segment lengths.
//!
//! Classes are keyed by their integer index `floor(elevation / interval)`, so
//! ordering never depends on parsing the display label. Labels such as
//! `"120-130m"` are produced only for output.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{AnalysisError, Result};

use super::segments::Segment;

/// Upper bound on the number of classes a single analysis may span.
pub const MAX_CLASSES: usize = 100_000;

/// A half-open elevation band `[lower, lower + interval)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationClass {
    index: i64,
    interval: f64,
}

impl ElevationClass {
    /// The class with the given index for `interval`.
    pub fn from_index(index: i64, interval: f64) -> Self {
        Self { index, interval }
    }

    /// The class containing `elevation`.
    ///
    /// An elevation lying exactly on a multiple of `interval` belongs to the
    /// band that starts there.
    pub fn containing(elevation: f64, interval: f64) -> Self {
        Self::from_index(class_index(elevation, interval), interval)
    }

    #[inline]
    pub fn index(&self) -> i64 {
        self.index
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.index as f64 * self.interval
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.lower() + self.interval
    }

    pub fn contains(&self, elevation: f64) -> bool {
        elevation >= self.lower() && elevation < self.upper()
    }

    /// Display label, bounds truncated to whole meters (e.g. `"0-10m"`).
    pub fn label(&self) -> String {
        format!("{}-{}m", self.lower() as i64, self.upper() as i64)
    }
}

impl fmt::Display for ElevationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Index of the class containing `elevation`.
#[inline]
pub fn class_index(elevation: f64, interval: f64) -> i64 {
    (elevation / interval).floor() as i64
}

/// Contiguous run of classes covering an elevation range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassRange {
    first: i64,
    end: i64,
    interval: f64,
}

impl ClassRange {
    /// Classes covering `[floor(z_min / interval), ceil(z_max / interval))`
    /// in interval units.
    ///
    /// A `z_max` on an exact multiple of `interval` closes the range there.
    /// A range with `z_min == z_max` still covers the one class containing it.
    pub fn spanning(z_min: f64, z_max: f64, interval: f64) -> Self {
        let first = class_index(z_min, interval);
        let end = ((z_max / interval).ceil() as i64).max(first.saturating_add(1));
        Self {
            first,
            end,
            interval,
        }
    }

    /// Number of classes in the range.
    #[inline]
    pub fn len(&self) -> usize {
        usize::try_from(self.end.saturating_sub(self.first)).unwrap_or(usize::MAX)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.first
    }

    #[inline]
    pub fn contains(&self, index: i64) -> bool {
        index >= self.first && index < self.end
    }

    pub fn classes(&self) -> impl Iterator<Item = ElevationClass> {
        let interval = self.interval;
        (self.first..self.end).map(move |i| ElevationClass::from_index(i, interval))
    }
}

/// Accumulated horizontal length per elevation class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassAccumulator {
    interval: f64,
    lengths: BTreeMap<i64, f64>,
}

impl ClassAccumulator {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            lengths: BTreeMap::new(),
        }
    }

    /// Accumulates qualifying segments by midpoint elevation.
    pub fn from_segments<'a, I>(segments: I, interval: f64) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut acc = Self::new(interval);
        for segment in segments {
            acc.add(segment.midpoint_elevation, segment.horizontal_distance);
        }
        acc
    }

    /// Adds `length` to the class containing `elevation`.
    pub fn add(&mut self, elevation: f64, length: f64) {
        *self
            .lengths
            .entry(class_index(elevation, self.interval))
            .or_insert(0.0) += length;
    }

    /// Inserts a zero-length entry for every class of `range` not yet present.
    pub fn fill_range(&mut self, range: &ClassRange) {
        for class in range.classes() {
            self.lengths.entry(class.index()).or_insert(0.0);
        }
    }

    /// Classes of `range` with no accumulated entry.
    pub fn missing_from(&self, range: &ClassRange) -> Vec<ElevationClass> {
        range
            .classes()
            .filter(|class| !self.lengths.contains_key(&class.index()))
            .collect()
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn get(&self, class: &ElevationClass) -> Option<f64> {
        self.lengths.get(&class.index()).copied()
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.values().sum()
    }

    /// Classes and their lengths in ascending elevation order.
    pub fn iter(&self) -> impl Iterator<Item = (ElevationClass, f64)> + '_ {
        let interval = self.interval;
        self.lengths
            .iter()
            .map(move |(&i, &len)| (ElevationClass::from_index(i, interval), len))
    }
}

/// Banded segment lengths before and after gap-filling.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedClasses {
    /// Classes that received at least one segment.
    pub raw: ClassAccumulator,
    /// `raw` plus a zero entry for every other class of `range`.
    pub filled: ClassAccumulator,
    pub range: ClassRange,
}

/// Accumulates qualifying segments and zero-fills every class spanned by the
/// full point elevation range `[z_min, z_max]`.
///
/// # Errors
///
/// Returns `AnalysisError::Configuration` if the range would need more than
/// [`MAX_CLASSES`] classes at this interval.
pub fn band_segments(
    segments: &[Segment],
    z_min: f64,
    z_max: f64,
    interval: f64,
) -> Result<BandedClasses> {
    let range = ClassRange::spanning(z_min, z_max, interval);
    if range.len() > MAX_CLASSES {
        return Err(AnalysisError::Configuration(format!(
            "elevation class interval {} m over {:.2} - {:.2} m needs {} classes (limit {})",
            interval,
            z_min,
            z_max,
            range.len(),
            MAX_CLASSES
        )));
    }

    let raw = ClassAccumulator::from_segments(segments, interval);
    let mut filled = raw.clone();
    filled.fill_range(&range);
    Ok(BandedClasses { raw, filled, range })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(midpoint_elevation: f64, horizontal_distance: f64) -> Segment {
        Segment {
            index: 0,
            horizontal_distance,
            slope_degrees: 0.0,
            midpoint_elevation,
        }
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(ElevationClass::containing(5.0, 10.0).label(), "0-10m");
        assert_eq!(ElevationClass::containing(123.4, 10.0).label(), "120-130m");
        assert_eq!(ElevationClass::containing(-3.0, 10.0).label(), "-10-0m");
        assert_eq!(ElevationClass::containing(7.0, 2.5).to_string(), "5-7m");
    }

    #[test]
    fn test_boundary_belongs_to_upper_band() {
        let class = ElevationClass::containing(20.0, 10.0);
        assert_eq!(class.index(), 2);
        assert_eq!(class.lower(), 20.0);
        assert!(class.contains(20.0));
        assert!(!class.contains(30.0));
        assert_eq!(ElevationClass::containing(19.999, 10.0).index(), 1);
    }

    #[test]
    fn test_class_range_spanning() {
        let range = ClassRange::spanning(3.0, 47.0, 10.0);
        assert_eq!(range.len(), 5);
        let labels: Vec<String> = range.classes().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["0-10m", "10-20m", "20-30m", "30-40m", "40-50m"]);

        let single = ClassRange::spanning(0.0, 5.0, 10.0);
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }

    #[test]
    fn test_class_range_closes_at_exact_maximum() {
        let range = ClassRange::spanning(0.0, 20.0, 10.0);
        assert_eq!(range.len(), 2);
        assert!(range.contains(1));
        assert!(!range.contains(2));

        let flat = ClassRange::spanning(20.0, 20.0, 10.0);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.classes().next().unwrap().label(), "20-30m");
    }

    #[test]
    fn test_class_range_count_is_ceil_minus_floor() {
        let cases = [
            (3.0, 47.0, 10.0),
            (0.0, 20.0, 10.0),
            (-25.0, -5.0, 10.0),
            (-10.0, 10.0, 5.0),
            (2.5, 7.5, 2.5),
            (101.0, 145.2, 10.0),
        ];
        for (z_min, z_max, interval) in cases {
            let range = ClassRange::spanning(z_min, z_max, interval);
            let expected =
                (z_max / interval).ceil() as i64 - (z_min / interval).floor() as i64;
            assert_eq!(range.len() as i64, expected, "{} .. {} by {}", z_min, z_max, interval);

            let indices: Vec<i64> = range.classes().map(|c| c.index()).collect();
            assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_accumulation_sums_per_class() {
        let segments = vec![
            seg(5.0, 10.0),
            seg(7.5, 2.5),
            seg(15.0, 4.0),
            seg(-2.0, 1.0),
        ];
        let acc = ClassAccumulator::from_segments(&segments, 10.0);

        assert_eq!(acc.len(), 3);
        assert_eq!(acc.get(&ElevationClass::from_index(0, 10.0)), Some(12.5));
        assert_eq!(acc.get(&ElevationClass::from_index(1, 10.0)), Some(4.0));
        assert_eq!(acc.get(&ElevationClass::from_index(-1, 10.0)), Some(1.0));
        assert!((acc.total_length() - 17.5).abs() < 1e-12);

        let order: Vec<i64> = acc.iter().map(|(c, _)| c.index()).collect();
        assert_eq!(order, vec![-1, 0, 1]);
    }

    #[test]
    fn test_band_segments_zero_fills_full_range() {
        let segments = vec![seg(12.0, 30.0), seg(41.0, 5.0)];
        let banded = band_segments(&segments, 3.0, 47.0, 10.0).unwrap();

        let lengths: Vec<f64> = banded.filled.iter().map(|(_, len)| len).collect();
        assert_eq!(lengths, vec![0.0, 30.0, 0.0, 0.0, 5.0]);
        assert!((banded.filled.total_length() - 35.0).abs() < 1e-12);
        assert_eq!(banded.raw.len(), 2);
        assert_eq!(banded.range.len(), 5);
    }

    #[test]
    fn test_band_segments_rejects_excessive_class_count() {
        let segments = vec![seg(500.0, 1.0)];
        let result = band_segments(&segments, 0.0, 1000.0, 1e-9);
        assert!(matches!(result, Err(AnalysisError::Configuration(_))));

        let at_limit = band_segments(&segments, 0.0, MAX_CLASSES as f64, 1.0).unwrap();
        assert_eq!(at_limit.filled.len(), MAX_CLASSES);
    }

    #[test]
    fn test_missing_from_raw_accumulator() {
        let segments = vec![seg(12.0, 30.0)];
        let raw = ClassAccumulator::from_segments(&segments, 10.0);
        let range = ClassRange::spanning(3.0, 27.0, 10.0);

        let missing: Vec<String> =
            raw.missing_from(&range).iter().map(|c| c.label()).collect();
        assert_eq!(missing, vec!["0-10m", "20-30m"]);

        let mut filled = raw.clone();
        filled.fill_range(&range);
        assert!(filled.missing_from(&range).is_empty());
    }
}
