use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::DEFAULT_CLOSURE_TOLERANCE,
    error::{BoundaryError, Result},
};

/// Tunable pipeline settings, loadable from `.toml` or `.json`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Contours with this many points or fewer are not simplified. `0` always simplifies.
    pub min_points_for_simplification: usize,
    /// Degrees within which the last projected point counts as equal to the first.
    #[schemars(range(min = 0.0))]
    pub ring_closure_tolerance: f64,
    /// Drop features smaller than this many hectares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_area_hectares: Option<f64>,
    /// Drop features whose model confidence is below this value
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_confidence: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_points_for_simplification: 0,
            ring_closure_tolerance: DEFAULT_CLOSURE_TOLERANCE,
            min_area_hectares: None,
            min_confidence: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path_ref)?),
            Some("json") => Self::from_json(&fs::read_to_string(path_ref)?),
            _ => Err(BoundaryError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ring_closure_tolerance >= 0.0 && self.ring_closure_tolerance.is_finite()) {
            return Err(BoundaryError::InvalidRequest(format!(
                "ring_closure_tolerance must be a finite value >= 0, got {}",
                self.ring_closure_tolerance
            )));
        }
        if let Some(c) = self.min_confidence {
            if !(0.0..=1.0).contains(&c) {
                return Err(BoundaryError::InvalidRequest(format!(
                    "min_confidence must be within [0, 1], got {}", c
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_always_simplify() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_points_for_simplification, 0);
        assert_eq!(config.ring_closure_tolerance, 1e-9);
        assert!(config.min_area_hectares.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = PipelineConfig::from_toml("min_points_for_simplification = 10\n").unwrap();
        assert_eq!(config.min_points_for_simplification, 10);
        assert_eq!(config.ring_closure_tolerance, DEFAULT_CLOSURE_TOLERANCE);
    }

    #[test]
    fn test_json_config() {
        let config = PipelineConfig::from_json(r#"{"min_confidence": 0.5, "ring_closure_tolerance": 0.0}"#).unwrap();
        assert_eq!(config.min_confidence, Some(0.5));
        assert_eq!(config.ring_closure_tolerance, 0.0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig {
            min_area_hectares: Some(0.25),
            ..Default::default()
        };
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(PipelineConfig::from_json(r#"{"ring_closure_tolerance": -1.0}"#).is_err());
        assert!(PipelineConfig::from_json(r#"{"min_confidence": 1.5}"#).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            PipelineConfig::from_file("pipeline.yaml"),
            Err(BoundaryError::UnsupportedFileFormat)
        ));
    }
}
