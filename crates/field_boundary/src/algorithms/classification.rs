use crate::types::{ScaleFactor, SizeCategory};

/// Buckets hectare estimates into size categories
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeClassifier;

impl SizeClassifier {
    pub fn classify(&self, area_hectares: f64) -> SizeCategory {
        if area_hectares < 1.0 {
            SizeCategory::HobbyFarm
        } else if area_hectares < 10.0 {
            SizeCategory::StandardCultivation
        } else if area_hectares < 100.0 {
            SizeCategory::LargeEstate
        } else {
            SizeCategory::MajorOperation
        }
    }

    /// Like [`classify`](Self::classify), but `Unknown` when no area could be estimated
    pub fn classify_scaled(&self, area_hectares: f64, scale: ScaleFactor) -> SizeCategory {
        if scale.is_unknown() {
            SizeCategory::Unknown
        } else {
            self.classify(area_hectares)
        }
    }
}
