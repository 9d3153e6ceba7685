use crate::types::{BoundaryFeature, DetectedInstance, GeoRing, SizeCategory};

/// Packages the per-instance stage outputs into a [`BoundaryFeature`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn assemble(
        &self,
        source_id: usize,
        instance: &DetectedInstance,
        geometry: GeoRing,
        area_hectares: f64,
        size_category: SizeCategory,
    ) -> BoundaryFeature {
        BoundaryFeature {
            geometry,
            area_hectares: area_hectares.max(0.0),
            size_category,
            source_id,
            label: instance.class_label.clone(),
            confidence: instance.confidence,
        }
    }
}
