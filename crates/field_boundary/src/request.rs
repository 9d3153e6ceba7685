use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BoundaryError, Result},
    types::{
        DetectedInstance, GeoPoint, ImageDimensions, PixelPoint, PixelPolygon,
        SegmentationResult, ViewportBounds,
    },
};

/// Viewport bounds as they arrive on the wire
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum BoundsPayload {
    /// `{north, south, east, west}`
    Edges {
        north: f64,
        south: f64,
        east: f64,
        west: f64,
    },
    /// `{north_east: {lat, lng}, south_west: {lat, lng}}`
    Corners {
        north_east: GeoPoint,
        south_west: GeoPoint,
    },
}

impl BoundsPayload {
    /// Normalize to the four-edge form, validating the result
    pub fn to_viewport(&self) -> Result<ViewportBounds> {
        match *self {
            BoundsPayload::Edges { north, south, east, west } => {
                ViewportBounds::new(north, south, east, west)
            }
            BoundsPayload::Corners { north_east, south_west } => {
                ViewportBounds::from_corners(north_east, south_west)
            }
        }
    }
}

/// One instance of the segmentation model output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct InstancePayload {
    #[schemars(description = "Mask outline as [x, y] pixel pairs; fractional values are truncated")]
    pub polygon: Vec<[f64; 2]>,
    #[serde(default, alias = "class", skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl InstancePayload {
    pub fn to_instance(&self) -> DetectedInstance {
        let points = self.polygon
            .iter()
            .map(|&[x, y]| PixelPoint::new(x as i32, y as i32))
            .collect();

        DetectedInstance {
            polygon: PixelPolygon::new(points),
            class_label: self.class_label.clone(),
            confidence: self.confidence,
        }
    }
}

/// A boundary tracing request: image size, viewport and model output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DetectionRequest {
    #[schemars(description = "Width of the segmented image in pixels")]
    pub image_width: i64,
    #[schemars(description = "Height of the segmented image in pixels")]
    pub image_height: i64,
    #[serde(alias = "map_bounds")]
    #[schemars(description = "Geographic rectangle covered by the image")]
    pub bounds: BoundsPayload,
    #[serde(default)]
    #[schemars(description = "Per-instance mask polygons from the segmentation model")]
    pub instances: Vec<InstancePayload>,
    #[serde(default)]
    #[schemars(description = "Skip contour simplification and keep every mask vertex")]
    pub preserve_detail: bool,
}

impl DetectionRequest {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validated image dimensions; both sides must be positive
    pub fn dimensions(&self) -> Result<ImageDimensions> {
        let invalid = || BoundaryError::InvalidDimensions {
            width: self.image_width,
            height: self.image_height,
        };

        let width = u32::try_from(self.image_width).map_err(|_| invalid())?;
        let height = u32::try_from(self.image_height).map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(ImageDimensions::new(width, height))
    }

    pub fn viewport(&self) -> Result<ViewportBounds> {
        self.bounds.to_viewport()
    }

    pub fn segmentation(&self) -> SegmentationResult {
        SegmentationResult::new(self.instances.iter().map(InstancePayload::to_instance).collect())
    }

    /// Get the JSON schema of the request body
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectionRequest)
    }
}
