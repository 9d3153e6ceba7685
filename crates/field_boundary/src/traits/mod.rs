use crate::types::{BoundaryFeature, PixelPolygon};

/// Trait for contour simplification algorithms
pub trait ContourSimplifier: Send + Sync {
    /// Reduce the vertex count of a pixel polygon, preserving vertex order.
    /// The output never has more points than the input.
    fn simplify(&self, polygon: &PixelPolygon) -> PixelPolygon;
}

/// Trait for filters applied to assembled features
pub trait FeatureFilter: Send + Sync {
    /// Return false to drop the feature from the output
    fn keep(&self, feature: &BoundaryFeature) -> bool;
}
