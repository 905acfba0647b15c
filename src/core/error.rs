//! Errors raised by the level-extraction core.

use thiserror::Error;

/// Errors that abort a level analysis.
///
/// Segments rejected by the slope/radius filter are not errors; they are
/// counted and reported in the validation summary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The point sequence cannot form any segment or contains unusable values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A threshold or interval is out of range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Normalization was requested but every class length is zero.
    #[error("cannot normalize distribution: maximum class length is zero")]
    DegenerateNormalization,
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
