use crate::{
    algorithms::{ArcLengthSimplifier, ConfidenceFilter, MinimumAreaFilter, RingCloser},
    config::PipelineConfig,
    pipeline::Pipeline,
    traits::{ContourSimplifier, FeatureFilter},
};

/// Builder for creating boundary pipelines with a fluent API
pub struct PipelineBuilder {
    simplifier: Option<Box<dyn ContourSimplifier>>,
    min_points_for_simplification: usize,
    closer: RingCloser,
    filters: Vec<Box<dyn FeatureFilter>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            simplifier: None,
            min_points_for_simplification: 0,
            closer: RingCloser::default(),
            filters: Vec::new(),
        }
    }

    /// Set the contour simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: ContourSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Only simplify contours with more than `min_points` vertices
    pub fn with_simplification_threshold(mut self, min_points: usize) -> Self {
        self.min_points_for_simplification = min_points;
        self
    }

    /// Tolerance in degrees for treating a projected ring as already closed
    pub fn with_closure_tolerance(mut self, tolerance: f64) -> Self {
        self.closer = RingCloser { tolerance: tolerance.max(0.0) };
        self
    }

    /// Add a filter applied to assembled features
    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: FeatureFilter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    /// Drop features smaller than `min_hectares`
    pub fn with_min_area(self, min_hectares: f64) -> Self {
        self.add_filter(MinimumAreaFilter { min_hectares })
    }

    /// Drop features whose model confidence is below `min_confidence`
    pub fn with_min_confidence(self, min_confidence: f64) -> Self {
        self.add_filter(ConfidenceFilter { min_confidence })
    }

    /// Apply every setting from a loaded configuration
    pub fn with_config(self, config: &PipelineConfig) -> Self {
        let mut builder = self
            .with_simplification_threshold(config.min_points_for_simplification)
            .with_closure_tolerance(config.ring_closure_tolerance);

        if let Some(min_hectares) = config.min_area_hectares {
            builder = builder.with_min_area(min_hectares);
        }
        if let Some(min_confidence) = config.min_confidence {
            builder = builder.with_min_confidence(min_confidence);
        }
        builder
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let simplifier = self.simplifier
            .unwrap_or_else(|| Box::new(ArcLengthSimplifier));

        Pipeline::new(
            simplifier,
            self.min_points_for_simplification,
            self.closer,
            self.filters,
        )
    }

    /// Build a pipeline from configuration
    pub fn build_from_config(config: &PipelineConfig) -> Pipeline {
        Self::new().with_config(config).build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
