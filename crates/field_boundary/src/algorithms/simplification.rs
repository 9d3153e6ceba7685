use geo_types::LineString;
use crate::{traits::ContourSimplifier, types::{PixelPoint, PixelPolygon}};

/// Tolerance as a fraction of the closed contour's arc length
pub const ARC_LENGTH_EPSILON_RATIO: f64 = 0.01;

/// Douglas-Peucker over the closed contour using geo's implementation.
///
/// The contour is closed before simplifying so the closing edge takes part
/// in the split decisions; the appended vertex is removed again afterwards.
fn simplify_closed_contour(polygon: &PixelPolygon, epsilon: f64) -> PixelPolygon {
    use geo::Simplify;

    if polygon.len() < 3 {
        return polygon.clone();
    }

    let appended = !polygon.is_closed();
    let contour = polygon.to_line_string(true);
    let simplified: LineString<f64> = contour.simplify(&epsilon.max(0.0));

    let mut points: Vec<PixelPoint> = simplified
        .coords()
        .map(|coord| PixelPoint::new(coord.x.round() as i32, coord.y.round() as i32))
        .collect();

    if appended {
        points.pop();
    }

    PixelPolygon::new(points)
}

/// Douglas-Peucker with `epsilon = 1%` of the closed perimeter
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcLengthSimplifier;

impl ArcLengthSimplifier {
    pub fn epsilon_for(polygon: &PixelPolygon) -> f64 {
        ARC_LENGTH_EPSILON_RATIO * polygon.closed_perimeter()
    }
}

impl ContourSimplifier for ArcLengthSimplifier {
    fn simplify(&self, polygon: &PixelPolygon) -> PixelPolygon {
        simplify_closed_contour(polygon, Self::epsilon_for(polygon))
    }
}

/// Douglas-Peucker with a fixed pixel tolerance
#[derive(Debug, Clone, Copy)]
pub struct FixedToleranceSimplifier {
    pub epsilon: f64,
}

impl Default for FixedToleranceSimplifier {
    fn default() -> Self {
        Self { epsilon: 1.0 }
    }
}

impl ContourSimplifier for FixedToleranceSimplifier {
    fn simplify(&self, polygon: &PixelPolygon) -> PixelPolygon {
        simplify_closed_contour(polygon, self.epsilon)
    }
}
