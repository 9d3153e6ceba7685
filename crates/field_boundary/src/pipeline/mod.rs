pub mod builder;

use std::borrow::Cow;

use tracing::{debug, info, warn};

use crate::{
    algorithms::{
        AreaEstimator, FeatureAssembler, GeoProjector, MaskValidator, RingCloser, SizeClassifier,
    },
    error::Result,
    request::DetectionRequest,
    traits::{ContourSimplifier, FeatureFilter},
    types::{
        BoundaryFeature, DetectedInstance, ImageDimensions, ScaleFactor, SegmentationResult,
        TracedBoundaries, ViewportBounds,
    },
};

/// Per-request state shared by every instance
struct RequestContext {
    projector: GeoProjector,
    estimator: AreaEstimator,
    simplify: bool,
}

/// Converts per-instance pixel polygons into validated geographic boundaries
pub struct Pipeline {
    validator: MaskValidator,
    simplifier: Box<dyn ContourSimplifier>,
    min_points_for_simplification: usize,
    closer: RingCloser,
    classifier: SizeClassifier,
    assembler: FeatureAssembler,
    filters: Vec<Box<dyn FeatureFilter>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        simplifier: Box<dyn ContourSimplifier>,
        min_points_for_simplification: usize,
        closer: RingCloser,
        filters: Vec<Box<dyn FeatureFilter>>,
    ) -> Self {
        Self {
            validator: MaskValidator,
            simplifier,
            min_points_for_simplification,
            closer,
            classifier: SizeClassifier,
            assembler: FeatureAssembler,
            filters,
        }
    }

    /// Trace every instance of a segmentation result.
    ///
    /// Fails only on invalid bounds. Degenerate instances are dropped and a
    /// zero scale factor downgrades areas to unknown.
    pub fn process(
        &self,
        segmentation: &SegmentationResult,
        dimensions: ImageDimensions,
        bounds: &ViewportBounds,
    ) -> Result<TracedBoundaries> {
        self.process_with_detail(segmentation, dimensions, bounds, false)
    }

    /// Validate a wire request and trace it, honouring `preserve_detail`
    pub fn process_request(&self, request: &DetectionRequest) -> Result<TracedBoundaries> {
        let dimensions = request.dimensions()?;
        let bounds = request.viewport()?;
        self.process_with_detail(&request.segmentation(), dimensions, &bounds, request.preserve_detail)
    }

    fn process_with_detail(
        &self,
        segmentation: &SegmentationResult,
        dimensions: ImageDimensions,
        bounds: &ViewportBounds,
        preserve_detail: bool,
    ) -> Result<TracedBoundaries> {
        bounds.validate()?;

        let scale = ScaleFactor::from_viewport(bounds, dimensions);
        if scale.is_unknown() {
            warn!(
                width = dimensions.width,
                height = dimensions.height,
                "cannot estimate area per pixel, areas will be reported as unknown"
            );
        }

        let context = RequestContext {
            projector: GeoProjector::new(*bounds, dimensions),
            estimator: AreaEstimator::new(scale),
            simplify: !preserve_detail,
        };

        let features: Vec<BoundaryFeature> = segmentation.instances
            .iter()
            .enumerate()
            .filter_map(|(source_id, instance)| self.trace_instance(source_id, instance, &context))
            .collect();

        info!(
            instances = segmentation.instances.len(),
            features = features.len(),
            m2_per_pixel = scale.square_meters_per_pixel(),
            "traced field boundaries"
        );

        Ok(TracedBoundaries {
            features,
            image_width: dimensions.width,
            image_height: dimensions.height,
            scale_factor: scale,
        })
    }

    fn trace_instance(
        &self,
        source_id: usize,
        instance: &DetectedInstance,
        context: &RequestContext,
    ) -> Option<BoundaryFeature> {
        let polygon = &instance.polygon;

        // Step 1: Reject masks that cannot enclose an area
        if !self.validator.validate(polygon) {
            debug!(source_id, points = polygon.len(), "skipping instance: not enough points");
            return None;
        }

        // Step 2: Simplify, then re-validate
        let contour = if context.simplify && polygon.len() > self.min_points_for_simplification {
            Cow::Owned(self.simplifier.simplify(polygon))
        } else {
            Cow::Borrowed(polygon)
        };
        if !self.validator.validate(&contour) {
            debug!(source_id, points = contour.len(), "skipping instance: not enough points after simplification");
            return None;
        }

        // Step 3: Project to geographic coordinates
        let projected = context.projector.project_polygon(&contour);

        // Step 4: Close the ring
        let Some(ring) = self.closer.close(&projected) else {
            debug!(source_id, points = projected.len(), "skipping instance: ring has fewer than 4 points");
            return None;
        };

        // Step 5: Area and size class
        let area_hectares = context.estimator.hectares(&contour);
        let size_category = self.classifier.classify_scaled(area_hectares, context.estimator.scale());

        // Step 6: Assemble and filter
        let feature = self.assembler.assemble(source_id, instance, ring, area_hectares, size_category);
        if !self.filters.iter().all(|filter| filter.keep(&feature)) {
            debug!(source_id, area_hectares, "skipping instance: rejected by feature filter");
            return None;
        }

        Some(feature)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: simplify above {} points, ring closure tolerance {}, {} feature filters",
            self.min_points_for_simplification,
            self.closer.tolerance,
            self.filters.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::FixedToleranceSimplifier,
        types::{PixelPolygon, SizeCategory},
    };

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(10.0, 0.0, 10.0, 0.0).unwrap()
    }

    fn segmentation(polygons: &[&[[i32; 2]]]) -> SegmentationResult {
        SegmentationResult::new(
            polygons
                .iter()
                .map(|p| DetectedInstance::new(PixelPolygon::from_pairs(p)))
                .collect(),
        )
    }

    #[test]
    fn test_source_ids_follow_input_order() {
        let pipeline = Pipeline::builder().build();
        let input = segmentation(&[
            &[[0, 0], [10, 0], [10, 10], [0, 10]],
            &[[1, 1]],
            &[[20, 20], [40, 20], [40, 40], [20, 40]],
        ]);

        let result = pipeline.process(&input, ImageDimensions::new(100, 100), &bounds()).unwrap();
        let ids: Vec<usize> = result.features.iter().map(|f| f.source_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_invalid_bounds_fail_fast() {
        let pipeline = Pipeline::builder().build();
        let inverted = ViewportBounds { north: 0.0, south: 10.0, east: 10.0, west: 0.0 };
        let result = pipeline.process(&segmentation(&[]), ImageDimensions::new(100, 100), &inverted);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_segmentation_is_valid() {
        let pipeline = Pipeline::builder().build();
        let result = pipeline.process(&segmentation(&[]), ImageDimensions::new(100, 100), &bounds()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_size_gate_skips_small_contours() {
        // A huge tolerance would collapse the triangle-ish contour if applied
        let pipeline = Pipeline::builder()
            .set_simplifier(FixedToleranceSimplifier { epsilon: 1000.0 })
            .with_simplification_threshold(10)
            .build();
        let input = segmentation(&[&[[0, 0], [50, 0], [60, 5], [50, 50], [0, 50]]]);

        let result = pipeline.process(&input, ImageDimensions::new(100, 100), &bounds()).unwrap();
        assert_eq!(result.features[0].geometry.len(), 6);
    }

    #[test]
    fn test_collapsed_contour_is_dropped() {
        let pipeline = Pipeline::builder()
            .set_simplifier(FixedToleranceSimplifier { epsilon: 1000.0 })
            .build();
        let input = segmentation(&[&[[0, 0], [50, 0], [50, 50], [0, 50]]]);

        let result = pipeline.process(&input, ImageDimensions::new(100, 100), &bounds()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_out_of_frame_request_coordinates() {
        let request = DetectionRequest::from_json(r#"{
            "image_width": 100,
            "image_height": 100,
            "bounds": {"north": 10, "south": 0, "east": 10, "west": 0},
            "instances": [{"polygon": [[-2000000000, 0], [2000000000, 0], [0, 50]]}]
        }"#).unwrap();

        let pipeline = Pipeline::builder().build();
        let result = pipeline.process_request(&request).expect("Should process successfully");
        for feature in &result.features {
            assert_eq!(feature.geometry.first(), feature.geometry.last());
            assert!(feature.area_hectares.is_finite());
        }
    }

    #[test]
    fn test_preserve_detail_skips_simplification() {
        let request = DetectionRequest::from_json(r#"{
            "image_width": 100,
            "image_height": 100,
            "bounds": {"north": 10, "south": 0, "east": 10, "west": 0},
            "instances": [{"polygon": [[0, 0], [25, 0], [50, 0], [50, 50], [0, 50]]}],
            "preserve_detail": true
        }"#).unwrap();

        let pipeline = Pipeline::builder().build();
        let result = pipeline.process_request(&request).unwrap();
        // 5 vertices + closing point
        assert_eq!(result.features[0].geometry.len(), 6);
    }

    #[test]
    fn test_filters_drop_features() {
        let pipeline = Pipeline::builder().with_min_confidence(0.5).build();
        let input = SegmentationResult::new(vec![
            DetectedInstance::new(PixelPolygon::from_pairs(&[[0, 0], [50, 0], [50, 50], [0, 50]]))
                .with_confidence(0.2),
            DetectedInstance::new(PixelPolygon::from_pairs(&[[0, 0], [50, 0], [50, 50], [0, 50]]))
                .with_confidence(0.8)
                .with_label("field"),
        ]);

        let result = pipeline.process(&input, ImageDimensions::new(100, 100), &bounds()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.features[0].source_id, 1);
        assert_eq!(result.features[0].label.as_deref(), Some("field"));
        assert_eq!(result.features[0].size_category, SizeCategory::MajorOperation);
    }
}
