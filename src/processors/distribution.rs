//! Ordered elevation-class length series.

use crate::core::error::{AnalysisError, Result};

use super::banding::{ClassAccumulator, ElevationClass};

/// Value-axis label for absolute lengths.
pub const METERS_AXIS_LABEL: &str = "Horizontal extent (meters)";

/// Value-axis label for normalized lengths.
pub const NORMALIZED_AXIS_LABEL: &str = "Horizontal extent (normalized 0-1)";

/// One elevation class and its horizontal extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLength {
    pub class: ElevationClass,
    pub length: f64,
}

impl ClassLength {
    pub fn label(&self) -> String {
        self.class.label()
    }
}

/// Elevation classes in ascending order with their horizontal extents.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSeries {
    entries: Vec<ClassLength>,
    normalized: bool,
}

impl DistributionSeries {
    /// Builds an unnormalized series sorted by class lower bound.
    pub fn from_accumulator(acc: &ClassAccumulator) -> Self {
        let mut entries: Vec<ClassLength> = acc
            .iter()
            .map(|(class, length)| ClassLength { class, length })
            .collect();
        entries.sort_by_key(|e| e.class.index());

        Self {
            entries,
            normalized: false,
        }
    }

    /// Divides every length by the largest one.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DegenerateNormalization` if the largest length
    /// is zero, which happens when no segment qualified.
    pub fn normalize(mut self) -> Result<Self> {
        let max = self.max_length();
        if !(max.is_finite() && max > 0.0) {
            return Err(AnalysisError::DegenerateNormalization);
        }

        for entry in &mut self.entries {
            entry.length /= max;
        }
        self.normalized = true;
        Ok(self)
    }

    #[inline]
    pub fn entries(&self) -> &[ClassLength] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassLength> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn total_length(&self) -> f64 {
        self.entries.iter().map(|e| e.length).sum()
    }

    /// Largest class length, or 0 for an empty series.
    pub fn max_length(&self) -> f64 {
        self.entries.iter().map(|e| e.length).fold(0.0, f64::max)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(ClassLength::label).collect()
    }

    /// `(label, length)` pairs for presentation.
    pub fn to_pairs(&self) -> Vec<(String, f64)> {
        self.entries.iter().map(|e| (e.label(), e.length)).collect()
    }

    /// Label for the value axis of a chart of this series.
    pub fn value_axis_label(&self) -> &'static str {
        if self.normalized {
            NORMALIZED_AXIS_LABEL
        } else {
            METERS_AXIS_LABEL
        }
    }
}

impl<'a> IntoIterator for &'a DistributionSeries {
    type Item = &'a ClassLength;
    type IntoIter = std::slice::Iter<'a, ClassLength>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds the ordered series, normalizing it when requested.
pub fn build_distribution(acc: &ClassAccumulator, normalize: bool) -> Result<DistributionSeries> {
    let series = DistributionSeries::from_accumulator(acc);
    if normalize {
        series.normalize()
    } else {
        Ok(series)
    }
}
