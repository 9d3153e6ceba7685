use std::sync::Arc;

use crate::{
    config::PipelineConfig,
    error::Result,
    pipeline::{Pipeline, builder::PipelineBuilder},
    request::DetectionRequest,
};
use serde::{Serialize, Deserialize};
use schemars::JsonSchema;
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
    PartialEq, Eq, Default,
)]
#[serde(tag = "type")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryCommand {
    /// Trace boundaries into a GeoJSON FeatureCollection
    #[default]
    #[serde(rename = "trace_boundaries")]
    TraceBoundaries,

    /// Trace boundaries into a bare list of GeoJSON features
    #[serde(rename = "trace_feature_list")]
    TraceFeatureList,

    /// Trace open outlines in the legacy `{polygons: [{paths}]}` form
    #[serde(rename = "trace_paths")]
    TracePaths,
}

impl BoundaryCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(BoundaryCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::TraceBoundaries => "Trace field boundaries into a GeoJSON FeatureCollection with area and size class",
            Self::TraceFeatureList => "Trace field boundaries into a JSON array of GeoJSON features",
            Self::TracePaths => "Trace open {lat, lng} outlines without area, for legacy map clients",
        }
    }
}

/// Runs boundary commands against detection requests
#[derive(Clone)]
pub struct BoundaryTracer {
    pipeline: Arc<Pipeline>,
}

impl BoundaryTracer {
    pub fn new() -> Self {
        Self {
            pipeline: Arc::new(PipelineBuilder::new().build()),
        }
    }

    /// Create a new BoundaryTracer with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_pipeline(PipelineBuilder::build_from_config(config))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn execute(&self, command: BoundaryCommand, request: &DetectionRequest) -> Result<serde_json::Value> {
        let traced = self.pipeline.process_request(request)?;

        let value = match command {
            BoundaryCommand::TraceBoundaries => serde_json::to_value(traced.to_geojson()?)?,
            BoundaryCommand::TraceFeatureList => serde_json::to_value(traced.to_features()?)?,
            BoundaryCommand::TracePaths => serde_json::to_value(traced.to_paths()?)?,
        };
        Ok(value)
    }
}

impl Default for BoundaryTracer {
    fn default() -> Self {
        Self::new()
    }
}
