//! Core data types and I/O operations.

pub mod error;
pub mod loaders;
pub mod transforms;
pub mod writers;

pub use error::AnalysisError;
pub use loaders::{load_points, LoaderError, Point3D, PointSequence};
pub use writers::{write_distribution_tsv, write_segments_csv, write_summary_yaml, WriteError};
