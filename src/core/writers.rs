//! Data writers for analysis results.
//!
//! This module provides functions for writing level-analysis output:
//! - Tab-separated distribution export (one row per elevation class)
//! - CSV with per-pair segment diagnostics in survey order
//! - YAML validation summary

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::loaders::Point3D;
use crate::processors::distribution::DistributionSeries;
use crate::processors::segments::{segments, SegmentFilter};
use crate::processors::summary::ValidationSummary;

/// Header of the distribution export.
pub const DISTRIBUTION_HEADER: [&str; 2] = ["Elevation Class (m)", "Horizontal Extent"];

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// YAML serialization error.
    #[error("YAML write error for '{path}': {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write the distribution as a two-column tab-separated file.
///
/// The header is `Elevation Class (m)` / `Horizontal Extent`, followed by one
/// row per class in ascending order with the length to two decimals.
///
/// # Errors
///
/// Returns an error if parent directories or the file cannot be created, or
/// a row cannot be written.
///
/// # Example
///
/// ```no_run
/// use cave_levels::config::LevelConfig;
/// use cave_levels::core::loaders::Point3D;
/// use cave_levels::core::writers::write_distribution_tsv;
/// use cave_levels::processors::analyze_levels;
/// use std::path::Path;
///
/// let points = vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(10.0, 0.0, 1.0)];
/// let analysis = analyze_levels(&points, &LevelConfig::default()).unwrap();
/// write_distribution_tsv(Path::new("levels.tsv"), &analysis.series).unwrap();
/// ```
pub fn write_distribution_tsv(path: &Path, series: &DistributionSeries) -> Result<()> {
    ensure_parent_dirs(path)?;
    let buf_writer = create_buffered_writer(path)?;
    let mut tsv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(buf_writer);

    let path_str = path.display().to_string();

    tsv_writer
        .write_record(DISTRIBUTION_HEADER)
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for entry in series {
        tsv_writer
            .write_record(&[entry.label(), format!("{:.2}", entry.length)])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    tsv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write every consecutive-pair segment with its filter decision.
///
/// Creates a CSV with headers
/// `index,horizontal_distance,slope_degrees,midpoint_elevation,retained` and
/// one row per pair in survey order.
///
/// # Errors
///
/// Returns an error if parent directories or the file cannot be created, or
/// a row cannot be written.
pub fn write_segments_csv(path: &Path, points: &[Point3D], filter: &SegmentFilter) -> Result<()> {
    ensure_parent_dirs(path)?;
    let buf_writer = create_buffered_writer(path)?;
    let mut csv_writer = csv::Writer::from_writer(buf_writer);

    let path_str = path.display().to_string();

    csv_writer
        .write_record([
            "index",
            "horizontal_distance",
            "slope_degrees",
            "midpoint_elevation",
            "retained",
        ])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for segment in segments(points) {
        csv_writer
            .write_record(&[
                segment.index.to_string(),
                format!("{:.6}", segment.horizontal_distance),
                format!("{:.6}", segment.slope_degrees),
                format!("{:.6}", segment.midpoint_elevation),
                filter.accepts(&segment).to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write the validation summary as YAML.
pub fn write_summary_yaml(path: &Path, summary: &ValidationSummary) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();

    serde_yaml::to_writer(&mut writer, summary).map_err(|e| WriteError::YamlError {
        path: path_str.clone(),
        source: e,
    })?;

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
