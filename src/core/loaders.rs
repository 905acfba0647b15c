//! Loaders for surveyed point sequences.
//!
//! This module provides parsers for:
//! - CSV exports of a GIS point layer (x, y and a named elevation attribute)
//! - ASCII PLY point clouds (x, y, z vertices, z taken as elevation)
//!
//! Point order in the file is preserved; it defines which points are
//! consecutive survey stations.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, warn};
use thiserror::Error;

use crate::config::InputConfig;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No points found in {0}")]
    EmptyFile(PathBuf),

    #[error("Invalid PLY file: {0}")]
    InvalidPly(String),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported point file: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A single surveyed location; `z` is elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true if all three coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// Ordered sequence of surveyed points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSequence {
    /// Points in survey order.
    pub points: Vec<Point3D>,
    /// Rows dropped during loading because geometry or elevation was empty.
    pub skipped_rows: usize,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl PointSequence {
    /// Creates a new empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of consecutive point pairs.
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[inline]
    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.points.push(Point3D::new(x, y, z));
    }

    #[inline]
    pub fn as_slice(&self) -> &[Point3D] {
        &self.points
    }
}

impl From<Vec<Point3D>> for PointSequence {
    fn from(points: Vec<Point3D>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }
}

/// Supported point file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFormat {
    Csv,
    Ply,
}

/// Detect the point file format from its extension.
pub fn detect_format(path: &Path) -> Option<PointFormat> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt") {
        Some(PointFormat::Csv)
    } else if ext.eq_ignore_ascii_case("ply") {
        Some(PointFormat::Ply)
    } else {
        None
    }
}

/// Load a point sequence, choosing the parser from the file extension.
///
/// # Errors
///
/// Returns `LoaderError::UnsupportedFormat` for unknown extensions, or any
/// error from the underlying parser.
pub fn load_points<P: AsRef<Path>>(path: P, fields: &InputConfig) -> Result<PointSequence> {
    let path = path.as_ref();
    match detect_format(path) {
        Some(PointFormat::Csv) => load_points_csv(path, fields),
        Some(PointFormat::Ply) => load_points_ply(path),
        None => Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn parse_field(value: &str, name: &str, line: usize) -> Result<f64> {
    value.parse().map_err(|_| {
        LoaderError::ParseError(format!(
            "line {}: invalid {} value '{}'",
            line, name, value
        ))
    })
}

/// Load points from a CSV export of a point layer.
///
/// Columns are looked up by the names in `fields` (case-insensitive). Rows
/// where x, y or elevation is blank are features without usable geometry and
/// are skipped; the count is kept in `PointSequence::skipped_rows`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a named column is missing, a
/// non-blank value is not numeric, or no point could be read.
pub fn load_points_csv<P: AsRef<Path>>(path: P, fields: &InputConfig) -> Result<PointSequence> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let col_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_lowercase(), i))
        .collect();

    let column = |name: &str| {
        col_map
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| LoaderError::MissingColumns(name.to_string()))
    };
    let x_idx = column(&fields.x_field)?;
    let y_idx = column(&fields.y_field)?;
    let z_idx = column(&fields.elevation_field)?;

    let mut sequence = PointSequence::with_capacity(1024);

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let x = record.get(x_idx).unwrap_or("");
        let y = record.get(y_idx).unwrap_or("");
        let z = record.get(z_idx).unwrap_or("");

        if x.is_empty() || y.is_empty() || z.is_empty() {
            sequence.skipped_rows += 1;
            continue;
        }

        sequence.push(
            parse_field(x, &fields.x_field, line)?,
            parse_field(y, &fields.y_field, line)?,
            parse_field(z, &fields.elevation_field, line)?,
        );
    }

    if sequence.skipped_rows > 0 {
        warn!(
            "{}: skipped {} rows with empty geometry or elevation",
            path.display(),
            sequence.skipped_rows
        );
    }

    if sequence.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    debug!("Loaded {} points from {}", sequence.len(), path.display());
    sequence.source_path = Some(path.to_path_buf());
    Ok(sequence)
}

/// Load points from an ASCII PLY file.
///
/// Vertices must provide x, y and z properties; any other properties are
/// ignored. Vertex order is taken as survey order.
///
/// # Errors
///
/// Returns an error if the file is not a valid ASCII PLY, lacks a coordinate
/// property, or holds fewer vertices than its header declares.
pub fn load_points_ply<P: AsRef<Path>>(path: P) -> Result<PointSequence> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let first_line = lines
        .next()
        .ok_or_else(|| LoaderError::InvalidPly("Empty file".to_string()))??;

    if !first_line.trim().starts_with("ply") {
        return Err(LoaderError::InvalidPly(format!(
            "{} is not a PLY file",
            path.display()
        )));
    }

    let mut num_vertices: Option<usize> = None;
    let mut prop_names: Vec<String> = Vec::new();
    let mut in_vertex_element = false;
    let mut header_done = false;
    // 1-based file line of the last line consumed
    let mut line_no = 1;

    for line in &mut lines {
        let line = line?;
        line_no += 1;
        let stripped = line.trim();

        if stripped.starts_with("format") && !stripped.contains("ascii") {
            return Err(LoaderError::InvalidPly(
                "only ASCII PLY files are supported".to_string(),
            ));
        } else if stripped.starts_with("element") {
            let parts: Vec<&str> = stripped.split_whitespace().collect();
            in_vertex_element = parts.get(1) == Some(&"vertex");
            if in_vertex_element {
                num_vertices = parts.get(2).and_then(|s| s.parse().ok());
            }
        } else if stripped.starts_with("property") && in_vertex_element {
            if let Some(name) = stripped.split_whitespace().last() {
                prop_names.push(name.to_string());
            }
        } else if stripped == "end_header" {
            header_done = true;
            break;
        }
    }

    let num_vertices = num_vertices
        .ok_or_else(|| LoaderError::InvalidPly("No vertex count in header".to_string()))?;

    if !header_done {
        return Err(LoaderError::InvalidPly("Missing end_header".to_string()));
    }

    let prop_idx: HashMap<&str, usize> = prop_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let index_of = |name: &str| {
        prop_idx
            .get(name)
            .copied()
            .ok_or_else(|| LoaderError::MissingColumns(name.to_string()))
    };
    let x_idx = index_of("x")?;
    let y_idx = index_of("y")?;
    let z_idx = index_of("z")?;

    let mut sequence = PointSequence::with_capacity(num_vertices);

    for line in lines {
        if sequence.len() >= num_vertices {
            break;
        }

        let line = line?;
        line_no += 1;
        let values: Vec<&str> = line.split_whitespace().collect();

        if values.is_empty() {
            continue;
        }
        if values.len() < prop_names.len() {
            return Err(LoaderError::ParseError(format!(
                "line {}: expected {} vertex values, found {}",
                line_no,
                prop_names.len(),
                values.len()
            )));
        }

        sequence.push(
            parse_field(values[x_idx], "x", line_no)?,
            parse_field(values[y_idx], "y", line_no)?,
            parse_field(values[z_idx], "z", line_no)?,
        );
    }

    if sequence.len() < num_vertices {
        return Err(LoaderError::InvalidPly(format!(
            "Expected {} vertices, found {}",
            num_vertices,
            sequence.len()
        )));
    }

    if sequence.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    sequence.source_path = Some(path.to_path_buf());
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_point_sequence_operations() {
        let mut seq = PointSequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.pair_count(), 0);

        seq.push(1.0, 2.0, 3.0);
        seq.push(4.0, 5.0, 6.0);

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.pair_count(), 1);
        assert_eq!(seq.as_slice()[1], Point3D::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("survey.CSV")), Some(PointFormat::Csv));
        assert_eq!(detect_format(Path::new("cloud.ply")), Some(PointFormat::Ply));
        assert_eq!(detect_format(Path::new("layer.shp")), None);
        assert_eq!(detect_format(Path::new("noext")), None);
    }

    #[test]
    fn test_load_csv_with_named_elevation_field() -> Result<()> {
        let file = csv_file("id,X,Y,Elevation\n1,0.0,0.0,100.5\n2,10.0,0.0,101.0\n");
        let fields = InputConfig {
            elevation_field: "elevation".to_string(),
            ..InputConfig::default()
        };

        let seq = load_points_csv(file.path(), &fields)?;
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.points[0], Point3D::new(0.0, 0.0, 100.5));
        assert_eq!(seq.points[1], Point3D::new(10.0, 0.0, 101.0));
        assert_eq!(seq.skipped_rows, 0);
        assert!(seq.source_path.is_some());

        Ok(())
    }

    #[test]
    fn test_load_csv_skips_empty_geometry() -> Result<()> {
        let file = csv_file("x,y,z\n0,0,1\n,,\n5,5,\n2,2,3\n");
        let seq = load_points_csv(file.path(), &InputConfig::default())?;
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.skipped_rows, 2);
        Ok(())
    }

    #[test]
    fn test_load_csv_missing_elevation_column() {
        let file = csv_file("x,y,height\n0,0,1\n");
        let result = load_points_csv(file.path(), &InputConfig::default());
        assert!(matches!(result, Err(LoaderError::MissingColumns(name)) if name == "z"));
    }

    #[test]
    fn test_load_csv_rejects_non_numeric() {
        let file = csv_file("x,y,z\n0,0,1\n1,1,deep\n");
        let result = load_points_csv(file.path(), &InputConfig::default());
        match result {
            Err(LoaderError::ParseError(msg)) => assert!(msg.contains("line 3")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_header_only() {
        let file = csv_file("x,y,z\n");
        let result = load_points_csv(file.path(), &InputConfig::default());
        assert!(matches!(result, Err(LoaderError::EmptyFile(_))));
    }

    #[test]
    fn test_load_ply() -> Result<()> {
        let mut file = Builder::new().suffix(".ply").tempfile().unwrap();
        writeln!(file, "ply").unwrap();
        writeln!(file, "format ascii 1.0").unwrap();
        writeln!(file, "element vertex 2").unwrap();
        writeln!(file, "property float x").unwrap();
        writeln!(file, "property float y").unwrap();
        writeln!(file, "property float z").unwrap();
        writeln!(file, "property uchar red").unwrap();
        writeln!(file, "end_header").unwrap();
        writeln!(file, "1.0 2.0 3.0 255").unwrap();
        writeln!(file, "4.0 5.0 6.0 0").unwrap();
        file.flush().unwrap();

        let seq = load_points(file.path(), &InputConfig::default())?;
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.points[1], Point3D::new(4.0, 5.0, 6.0));

        Ok(())
    }

    #[test]
    fn test_load_ply_truncated() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ply").unwrap();
        writeln!(file, "format ascii 1.0").unwrap();
        writeln!(file, "element vertex 3").unwrap();
        writeln!(file, "property float x").unwrap();
        writeln!(file, "property float y").unwrap();
        writeln!(file, "property float z").unwrap();
        writeln!(file, "end_header").unwrap();
        writeln!(file, "1.0 2.0 3.0").unwrap();
        file.flush().unwrap();

        let result = load_points_ply(file.path());
        assert!(matches!(result, Err(LoaderError::InvalidPly(_))));
    }

    fn ply_file(body: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ply").unwrap();
        writeln!(file, "format ascii 1.0").unwrap();
        writeln!(file, "element vertex 3").unwrap();
        writeln!(file, "property float x").unwrap();
        writeln!(file, "property float y").unwrap();
        writeln!(file, "property float z").unwrap();
        writeln!(file, "end_header").unwrap();
        for line in body {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_ply_reports_file_line() {
        // Header takes lines 1-7, so the second vertex sits on line 9.
        let file = ply_file(&["1.0 2.0 3.0", "4.0 abc 6.0", "7.0 8.0 9.0"]);
        match load_points_ply(file.path()) {
            Err(LoaderError::ParseError(msg)) => {
                assert!(msg.starts_with("line 9:"), "{}", msg);
                assert!(msg.contains("invalid y value 'abc'"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_ply_rejects_short_vertex_line() {
        let file = ply_file(&["1.0 2.0 3.0", "", "4.0 5.0", "7.0 8.0 9.0"]);
        match load_points_ply(file.path()) {
            Err(LoaderError::ParseError(msg)) => {
                assert_eq!(msg, "line 10: expected 3 vertex values, found 2");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_ply_skips_blank_lines() {
        let file = ply_file(&["1.0 2.0 3.0", "", "4.0 5.0 6.0", "7.0 8.0 9.0"]);
        let seq = load_points_ply(file.path()).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.points[2], Point3D::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_load_ply_rejects_binary() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ply").unwrap();
        writeln!(file, "format binary_little_endian 1.0").unwrap();
        writeln!(file, "end_header").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_points_ply(file.path()),
            Err(LoaderError::InvalidPly(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".shp").tempfile().unwrap();
        let result = load_points(file.path(), &InputConfig::default());
        assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
    }
}
