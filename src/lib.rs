//! Cave level extraction from 3D cave-survey point sequences.
//!
//! This crate provides tools for:
//! - Loading ordered survey points from CSV or ASCII PLY exports
//! - Classifying consecutive point pairs as near-horizontal passage segments
//! - Banding qualifying horizontal extent into fixed-width elevation classes
//! - Exporting the distribution as a chart, a tab-separated table and a
//!   validation summary
//!
//! # Example
//!
//! ```no_run
//! use cave_levels::config::PipelineConfig;
//! use cave_levels::core::loaders::load_points;
//! use cave_levels::processors::analyze_levels;
//!
//! let config = PipelineConfig::default();
//! let survey = load_points("survey.csv", &config.input).unwrap();
//! let analysis = analyze_levels(survey.as_slice(), &config.levels).unwrap();
//! for line in analysis.summary.report_lines() {
//!     println!("{}", line);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{ChartConfig, InputConfig, LevelConfig, PipelineConfig};
pub use core::error::AnalysisError;
pub use core::loaders::{Point3D, PointSequence};
pub use processors::{analyze_levels, DistributionSeries, LevelAnalysis, ValidationSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
