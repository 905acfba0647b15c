//! Level extraction stages.

pub mod banding;
pub mod distribution;
pub mod pipeline;
pub mod segments;
pub mod summary;

// Re-export key types for convenience
pub use banding::{
    band_segments, BandedClasses, ClassAccumulator, ClassRange, ElevationClass, MAX_CLASSES,
};
pub use distribution::{build_distribution, ClassLength, DistributionSeries};
pub use pipeline::{analyze_levels, LevelAnalysis};
pub use segments::{segments, FilterOutcome, Segment, SegmentFilter};
pub use summary::{summarize, ValidationSummary};
