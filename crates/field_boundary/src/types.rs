use serde::{Deserialize, Serialize};
use geo_types::{Coord, LineString, Polygon};
use schemars::JsonSchema;
use strum::IntoStaticStr;
use ts_rs::TS;

use crate::error::{BoundaryError, Result};

/// A vertex of a segmentation mask polygon, in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn to_coord(self) -> Coord<f64> {
        Coord { x: self.x as f64, y: self.y as f64 }
    }
}

impl From<[i32; 2]> for PixelPoint {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

/// Ordered outline of one detected instance. Not required to be closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPolygon {
    pub points: Vec<PixelPoint>,
}

impl PixelPolygon {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self { points }
    }

    /// Build from `[x, y]` pairs as emitted by the segmentation model
    pub fn from_pairs(pairs: &[[i32; 2]]) -> Self {
        Self {
            points: pairs.iter().copied().map(PixelPoint::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the last vertex repeats the first
    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    /// Convert to a geo-types LineString, optionally appending the first vertex
    pub fn to_line_string(&self, close: bool) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|p| p.to_coord())
            .collect();

        if close && !self.is_closed() {
            if let Some(&first) = coords.first() {
                coords.push(first);
            }
        }

        LineString::new(coords)
    }

    /// Convert to geo-types Polygon for area computation
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_line_string(true), vec![])
    }

    /// Arc length of the outline, including the closing segment
    pub fn closed_perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }

        let segment = |a: &PixelPoint, b: &PixelPoint| {
            let dx = b.x as f64 - a.x as f64;
            let dy = b.y as f64 - a.y as f64;
            (dx * dx + dy * dy).sqrt()
        };

        let open: f64 = self.points
            .windows(2)
            .map(|w| segment(&w[0], &w[1]))
            .sum();

        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => open + segment(last, first),
            _ => open,
        }
    }
}

/// Pixel size of the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero width or height: projection collapses and area is unknown
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordinate-wise comparison with an absolute tolerance in degrees
    pub fn approx_eq(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }

    /// GeoJSON position order: `[lng, lat]`
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }
}

/// The geographic rectangle the source image is assumed to cover exactly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ViewportBounds {
    /// Create bounds, rejecting inverted or non-finite edges
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        let bounds = Self { north, south, east, west };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Normalize the `{north_east, south_west}` corner form
    pub fn from_corners(north_east: GeoPoint, south_west: GeoPoint) -> Result<Self> {
        Self::new(north_east.lat, south_west.lat, north_east.lng, south_west.lng)
    }

    pub fn validate(&self) -> Result<()> {
        let edges = [self.north, self.south, self.east, self.west];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(BoundaryError::InvalidBounds(format!("non-finite edge in {:?}", self)));
        }
        if self.north > 90.0 || self.south < -90.0 {
            return Err(BoundaryError::InvalidBounds(format!(
                "latitude outside [-90, 90]: north={} south={}",
                self.north, self.south
            )));
        }
        if self.north <= self.south {
            return Err(BoundaryError::InvalidBounds(format!(
                "north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        if self.east <= self.west {
            return Err(BoundaryError::InvalidBounds(format!(
                "east ({}) must be greater than west ({})",
                self.east, self.west
            )));
        }
        Ok(())
    }

    pub fn width_degrees(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_degrees(&self) -> f64 {
        self.north - self.south
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }
}

/// A closed linear ring: at least four points, first equal to last.
///
/// Only the ring closer can build one, so the invariant holds for every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRing {
    points: Vec<GeoPoint>,
}

impl GeoRing {
    pub(crate) fn from_closed(points: Vec<GeoPoint>) -> Self {
        debug_assert!(points.len() >= 4);
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn last(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Ring positions in GeoJSON `[lng, lat]` order
    pub fn positions(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(GeoPoint::to_position).collect()
    }

    /// The ring without its closing point
    pub fn open_path(&self) -> &[GeoPoint] {
        &self.points[..self.points.len() - 1]
    }
}

/// Square meters covered by one pixel at the viewport's mean latitude.
///
/// Zero means the area cannot be estimated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct ScaleFactor(pub(crate) f64);

impl ScaleFactor {
    pub const UNKNOWN: ScaleFactor = ScaleFactor(0.0);

    pub fn square_meters_per_pixel(&self) -> f64 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 <= 0.0
    }
}

/// Size bucket of a detected boundary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema, TS,
    IntoStaticStr,
)]
pub enum SizeCategory {
    #[serde(rename = "Hobby Farm (<1 Ha)")]
    #[strum(serialize = "Hobby Farm (<1 Ha)")]
    HobbyFarm,
    #[serde(rename = "Standard Cultivation (1-10 Ha)")]
    #[strum(serialize = "Standard Cultivation (1-10 Ha)")]
    StandardCultivation,
    #[serde(rename = "Large Estate (10-100 Ha)")]
    #[strum(serialize = "Large Estate (10-100 Ha)")]
    LargeEstate,
    #[serde(rename = "Major Operation (>100 Ha)")]
    #[strum(serialize = "Major Operation (>100 Ha)")]
    MajorOperation,
    Unknown,
}

impl SizeCategory {
    /// Full label including the hectare range
    pub fn label(&self) -> &'static str {
        self.into()
    }

    /// Category name without the hectare range
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::HobbyFarm => "Hobby Farm",
            Self::StandardCultivation => "Standard Cultivation",
            Self::LargeEstate => "Large Estate",
            Self::MajorOperation => "Major Operation",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected object as handed over by the segmentation model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectedInstance {
    pub polygon: PixelPolygon,
    pub class_label: Option<String>,
    pub confidence: Option<f64>,
}

impl DetectedInstance {
    pub fn new(polygon: PixelPolygon) -> Self {
        Self { polygon, class_label: None, confidence: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.class_label = Some(label.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Already-computed model output for one image
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentationResult {
    pub instances: Vec<DetectedInstance>,
}

impl SegmentationResult {
    pub fn new(instances: Vec<DetectedInstance>) -> Self {
        Self { instances }
    }
}

/// Terminal output for one valid instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryFeature {
    pub geometry: GeoRing,
    pub area_hectares: f64,
    pub size_category: SizeCategory,
    /// Index of the instance in the model output
    pub source_id: usize,
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

impl BoundaryFeature {
    /// Human readable summary, e.g. "Detected a Hobby Farm."
    pub fn message(&self) -> String {
        format!("Detected a {}.", self.size_category.short_name())
    }
}

/// Pipeline output for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracedBoundaries {
    pub features: Vec<BoundaryFeature>,
    pub image_width: u32,
    pub image_height: u32,
    pub scale_factor: ScaleFactor,
}

impl TracedBoundaries {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Sum of all feature areas in hectares
    pub fn total_area_hectares(&self) -> f64 {
        self.features.iter().map(|f| f.area_hectares).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_perimeter_includes_closing_segment() {
        let polygon = PixelPolygon::from_pairs(&[[0, 0], [3, 0], [3, 4]]);
        // 3 + 4 + 5
        assert!((polygon.closed_perimeter() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_closed_perimeter_of_already_closed_polygon() {
        let open = PixelPolygon::from_pairs(&[[0, 0], [10, 0], [10, 10], [0, 10]]);
        let closed = PixelPolygon::from_pairs(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]);
        assert_eq!(open.closed_perimeter(), closed.closed_perimeter());
    }

    #[test]
    fn test_closed_perimeter_far_outside_the_frame() {
        let polygon = PixelPolygon::from_pairs(&[[-2_000_000_000, 0], [2_000_000_000, 0], [0, 50]]);
        let perimeter = polygon.closed_perimeter();
        assert!(perimeter.is_finite());
        assert!(perimeter > 8.0e9);
    }

    #[test]
    fn test_to_line_string_close_is_not_doubled() {
        let closed = PixelPolygon::from_pairs(&[[0, 0], [10, 0], [10, 10], [0, 0]]);
        assert_eq!(closed.to_line_string(true).0.len(), 4);

        let open = PixelPolygon::from_pairs(&[[0, 0], [10, 0], [10, 10]]);
        assert_eq!(open.to_line_string(true).0.len(), 4);
        assert_eq!(open.to_line_string(false).0.len(), 3);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(ViewportBounds::new(10.0, 0.0, 10.0, 0.0).is_ok());
        assert!(ViewportBounds::new(0.0, 10.0, 10.0, 0.0).is_err());
        assert!(ViewportBounds::new(10.0, 0.0, 0.0, 10.0).is_err());
        assert!(ViewportBounds::new(10.0, 10.0, 10.0, 0.0).is_err());
        assert!(ViewportBounds::new(f64::NAN, 0.0, 10.0, 0.0).is_err());
        assert!(ViewportBounds::new(91.0, 0.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_bounds_from_corners() {
        let bounds = ViewportBounds::from_corners(
            GeoPoint::new(51.5, -0.1),
            GeoPoint::new(51.4, -0.2),
        ).expect("valid corners");
        assert_eq!(bounds.north, 51.5);
        assert_eq!(bounds.south, 51.4);
        assert_eq!(bounds.east, -0.1);
        assert_eq!(bounds.west, -0.2);
    }

    #[test]
    fn test_size_category_labels() {
        assert_eq!(SizeCategory::HobbyFarm.label(), "Hobby Farm (<1 Ha)");
        assert_eq!(SizeCategory::MajorOperation.short_name(), "Major Operation");
        assert_eq!(SizeCategory::Unknown.to_string(), "Unknown");
        assert_eq!(
            serde_json::to_value(SizeCategory::LargeEstate).unwrap(),
            serde_json::json!("Large Estate (10-100 Ha)")
        );
    }
}
