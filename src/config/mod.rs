//! Configuration types for the cave level pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::AnalysisError;

/// Errors that can occur while reading or writing a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Thresholds and banding parameters for level extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Maximum absolute slope (degrees) for a segment to qualify
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold_degrees: f64,

    /// Maximum horizontal distance (meters) for a segment to qualify
    #[serde(default = "default_radius_threshold")]
    pub radius_threshold_meters: f64,

    /// Width of each elevation class in meters
    #[serde(default = "default_class_interval")]
    pub elevation_class_interval_meters: f64,

    /// Rescale class lengths to [0, 1] by the largest class
    #[serde(default)]
    pub normalize: bool,
}

fn default_slope_threshold() -> f64 {
    15.0
}

fn default_radius_threshold() -> f64 {
    50.0
}

fn default_class_interval() -> f64 {
    10.0
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            slope_threshold_degrees: default_slope_threshold(),
            radius_threshold_meters: default_radius_threshold(),
            elevation_class_interval_meters: default_class_interval(),
            normalize: false,
        }
    }
}

impl LevelConfig {
    /// Check that thresholds and interval are usable.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Configuration` if the interval is not a
    /// positive finite number, the slope threshold is negative or not finite,
    /// or the radius threshold is not a positive finite number.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let interval = self.elevation_class_interval_meters;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "elevation class interval must be a positive number, got {}",
                interval
            )));
        }

        let slope = self.slope_threshold_degrees;
        if !slope.is_finite() || slope < 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "slope threshold must be a non-negative number of degrees, got {}",
                slope
            )));
        }

        let radius = self.radius_threshold_meters;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "radius threshold must be a positive number of meters, got {}",
                radius
            )));
        }

        Ok(())
    }
}

/// Column names used when reading points from CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_x_field")]
    pub x_field: String,

    #[serde(default = "default_y_field")]
    pub y_field: String,

    /// Attribute holding the surveyed elevation
    #[serde(default = "default_elevation_field")]
    pub elevation_field: String,
}

fn default_x_field() -> String {
    "x".to_string()
}

fn default_y_field() -> String {
    "y".to_string()
}

fn default_elevation_field() -> String {
    "z".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            x_field: default_x_field(),
            y_field: default_y_field(),
            elevation_field: default_elevation_field(),
        }
    }
}

/// Output settings for the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width in pixels
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// RGB fill color for the bars
    #[serde(default = "default_bar_color")]
    pub bar_color: [u8; 3],
}

fn default_chart_width() -> u32 {
    1200
}

fn default_chart_height() -> u32 {
    800
}

fn default_bar_color() -> [u8; 3] {
    [70, 130, 180] // steel blue
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            bar_color: default_bar_color(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub levels: LevelConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_level_config() {
        let config = LevelConfig::default();
        assert_eq!(config.slope_threshold_degrees, 15.0);
        assert_eq!(config.radius_threshold_meters, 50.0);
        assert_eq!(config.elevation_class_interval_meters, 10.0);
        assert!(!config.normalize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input.elevation_field, "z");
        assert_eq!(config.chart.width, 1200);
    }

    #[test]
    fn test_validate_rejects_bad_interval() {
        for interval in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = LevelConfig {
                elevation_class_interval_meters: interval,
                ..LevelConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(AnalysisError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_validate_thresholds() {
        let negative_slope = LevelConfig {
            slope_threshold_degrees: -1.0,
            ..LevelConfig::default()
        };
        assert!(negative_slope.validate().is_err());

        let zero_radius = LevelConfig {
            radius_threshold_meters: 0.0,
            ..LevelConfig::default()
        };
        assert!(zero_radius.validate().is_err());

        let flat_only = LevelConfig {
            slope_threshold_degrees: 0.0,
            ..LevelConfig::default()
        };
        assert!(flat_only.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "levels:\n  elevation_class_interval_meters: 5.0\n  normalize: true\n\
                    input:\n  elevation_field: ELEV\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.levels.elevation_class_interval_meters, 5.0);
        assert!(config.levels.normalize);
        assert_eq!(config.levels.slope_threshold_degrees, 15.0);
        assert_eq!(config.input.elevation_field, "ELEV");
        assert_eq!(config.input.x_field, "x");
        assert_eq!(config.chart, ChartConfig::default());
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("levels.yaml");

        let mut config = PipelineConfig::default();
        config.levels.radius_threshold_meters = 25.0;
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let result = PipelineConfig::from_yaml(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
