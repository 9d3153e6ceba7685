use crate::{traits::FeatureFilter, types::BoundaryFeature};

/// Drops features below a hectare threshold. Features with an unknown
/// area are kept.
#[derive(Debug, Clone)]
pub struct MinimumAreaFilter {
    pub min_hectares: f64,
}

impl Default for MinimumAreaFilter {
    fn default() -> Self {
        Self { min_hectares: 0.01 }
    }
}

impl FeatureFilter for MinimumAreaFilter {
    fn keep(&self, feature: &BoundaryFeature) -> bool {
        use crate::types::SizeCategory;
        feature.size_category == SizeCategory::Unknown || feature.area_hectares >= self.min_hectares
    }
}

/// Drops features whose model confidence is below a threshold.
/// Features without a confidence score are kept.
#[derive(Debug, Clone)]
pub struct ConfidenceFilter {
    pub min_confidence: f64,
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self { min_confidence: 0.5 }
    }
}

impl FeatureFilter for ConfidenceFilter {
    fn keep(&self, feature: &BoundaryFeature) -> bool {
        feature.confidence.map_or(true, |c| c >= self.min_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::RingCloser,
        types::{GeoPoint, SizeCategory},
    };

    fn feature(area_hectares: f64, size_category: SizeCategory, confidence: Option<f64>) -> BoundaryFeature {
        let ring = RingCloser::default()
            .close(&[
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(0.0, 1.0),
            ])
            .unwrap();
        BoundaryFeature {
            geometry: ring,
            area_hectares,
            size_category,
            source_id: 0,
            label: None,
            confidence,
        }
    }

    #[test]
    fn test_minimum_area_filter() {
        let filter = MinimumAreaFilter { min_hectares: 1.0 };
        assert!(!filter.keep(&feature(0.5, SizeCategory::HobbyFarm, None)));
        assert!(filter.keep(&feature(1.0, SizeCategory::StandardCultivation, None)));
        assert!(filter.keep(&feature(0.0, SizeCategory::Unknown, None)));
    }

    #[test]
    fn test_confidence_filter() {
        let filter = ConfidenceFilter::default();
        assert!(!filter.keep(&feature(5.0, SizeCategory::StandardCultivation, Some(0.3))));
        assert!(filter.keep(&feature(5.0, SizeCategory::StandardCultivation, Some(0.5))));
        assert!(filter.keep(&feature(5.0, SizeCategory::StandardCultivation, None)));
    }
}
