use crate::types::PixelPolygon;

/// Smallest vertex count that can enclose an area
pub const MIN_POLYGON_POINTS: usize = 3;

/// Rejects instance polygons that cannot describe an area
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskValidator;

impl MaskValidator {
    pub fn validate(&self, polygon: &PixelPolygon) -> bool {
        polygon.len() >= MIN_POLYGON_POINTS
    }
}
