use crate::types::{ImageDimensions, PixelPolygon, ScaleFactor, ViewportBounds};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

impl ScaleFactor {
    /// Square meters per pixel using a flat-Earth approximation corrected
    /// by the cosine of the viewport's mean latitude.
    pub fn from_viewport(bounds: &ViewportBounds, dimensions: ImageDimensions) -> Self {
        if dimensions.is_degenerate() {
            return ScaleFactor::UNKNOWN;
        }

        let avg_lat_rad = ((bounds.north + bounds.south) / 2.0).to_radians();
        let dist_north_south_m = EARTH_RADIUS_M * bounds.height_degrees().to_radians();
        let dist_east_west_m =
            EARTH_RADIUS_M * bounds.width_degrees().to_radians() * avg_lat_rad.cos();

        let meters_per_pixel_y = dist_north_south_m / dimensions.height as f64;
        let meters_per_pixel_x = dist_east_west_m / dimensions.width as f64;

        let scale = meters_per_pixel_x * meters_per_pixel_y;
        if scale.is_finite() && scale > 0.0 {
            ScaleFactor(scale)
        } else {
            ScaleFactor::UNKNOWN
        }
    }
}

/// Converts pixel-space contour area to hectares
#[derive(Debug, Clone, Copy)]
pub struct AreaEstimator {
    scale: ScaleFactor,
}

impl AreaEstimator {
    pub fn new(scale: ScaleFactor) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    /// Shoelace area of the contour in square pixels
    pub fn pixel_area(polygon: &PixelPolygon) -> f64 {
        use geo::Area;
        polygon.to_geo_polygon().unsigned_area()
    }

    /// Area in hectares rounded to two decimals; `0.0` when the scale is unknown
    pub fn hectares(&self, polygon: &PixelPolygon) -> f64 {
        if self.scale.is_unknown() {
            return 0.0;
        }
        let square_meters = Self::pixel_area(polygon) * self.scale.square_meters_per_pixel();
        round_to_hundredths(square_meters / SQUARE_METERS_PER_HECTARE)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(10.0, 0.0, 10.0, 0.0).unwrap()
    }

    #[test]
    fn test_scale_factor_matches_flat_earth_formula() {
        let scale = ScaleFactor::from_viewport(&bounds(), ImageDimensions::new(100, 100));
        let ns = EARTH_RADIUS_M * 10f64.to_radians() / 100.0;
        let ew = EARTH_RADIUS_M * 10f64.to_radians() * 5f64.to_radians().cos() / 100.0;
        assert!((scale.square_meters_per_pixel() - ns * ew).abs() < 1e-3);
        assert!(!scale.is_unknown());
    }

    #[test]
    fn test_scale_factor_zero_for_degenerate_dimensions() {
        assert!(ScaleFactor::from_viewport(&bounds(), ImageDimensions::new(0, 100)).is_unknown());
        assert!(ScaleFactor::from_viewport(&bounds(), ImageDimensions::new(100, 0)).is_unknown());
        assert_eq!(
            ScaleFactor::from_viewport(&bounds(), ImageDimensions::new(0, 0)).square_meters_per_pixel(),
            0.0
        );
    }

    #[test]
    fn test_pixel_area_is_orientation_independent() {
        let clockwise = PixelPolygon::from_pairs(&[[0, 0], [0, 50], [50, 50], [50, 0]]);
        let counter = PixelPolygon::from_pairs(&[[0, 0], [50, 0], [50, 50], [0, 50]]);
        assert_eq!(AreaEstimator::pixel_area(&clockwise), 2500.0);
        assert_eq!(AreaEstimator::pixel_area(&counter), 2500.0);
    }

    #[test]
    fn test_hectares_uses_scale_and_rounds() {
        // 2 m x 2 m pixels
        let estimator = AreaEstimator::new(ScaleFactor(4.0));
        let polygon = PixelPolygon::from_pairs(&[[0, 0], [33, 0], [33, 33], [0, 33]]);
        // 1089 px * 4 m² = 4356 m² = 0.4356 ha
        assert_eq!(estimator.hectares(&polygon), 0.44);
    }

    #[test]
    fn test_unknown_scale_yields_zero_hectares() {
        let estimator = AreaEstimator::new(ScaleFactor::UNKNOWN);
        let polygon = PixelPolygon::from_pairs(&[[0, 0], [50, 0], [50, 50], [0, 50]]);
        assert_eq!(estimator.hectares(&polygon), 0.0);
    }
}
