use crate::types::{GeoPoint, ImageDimensions, PixelPoint, PixelPolygon, ViewportBounds};

/// Linear pixel-to-degree interpolation across the viewport.
///
/// This is a local equirectangular approximation, not an inverse Web Mercator
/// projection. Error grows with viewport height and latitude.
#[derive(Debug, Clone, Copy)]
pub struct GeoProjector {
    bounds: ViewportBounds,
    dimensions: ImageDimensions,
}

impl GeoProjector {
    pub fn new(bounds: ViewportBounds, dimensions: ImageDimensions) -> Self {
        Self { bounds, dimensions }
    }

    /// Pixel row 0 is the northern edge, column 0 the western edge.
    pub fn project(&self, point: PixelPoint) -> GeoPoint {
        let norm_x = normalize(point.x, self.dimensions.width);
        let norm_y = normalize(point.y, self.dimensions.height);

        GeoPoint {
            lat: self.bounds.north - norm_y * self.bounds.height_degrees(),
            lng: self.bounds.west + norm_x * self.bounds.width_degrees(),
        }
    }

    /// Project every vertex, yielding an open coordinate sequence
    pub fn project_polygon(&self, polygon: &PixelPolygon) -> Vec<GeoPoint> {
        polygon.points.iter().map(|&p| self.project(p)).collect()
    }
}

/// Clamp into `[0, extent - 1]` and scale to `[0, 1)`. A zero extent maps to 0.
fn normalize(value: i32, extent: u32) -> f64 {
    if extent == 0 {
        return 0.0;
    }
    let max = (extent - 1) as i64;
    let clamped = (value as i64).clamp(0, max);
    clamped as f64 / extent as f64
}
