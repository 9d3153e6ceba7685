//! # Field Boundary Tracing Library
//!
//! Converts per-instance segmentation output (mask polygons in image pixels)
//! into closed geographic rings with a hectare estimate and a size class,
//! ready for a mapping front end.
//!
//! ## Pipeline
//!
//! Each instance flows through, independently of the others:
//!
//! 1. mask validation (at least 3 points)
//! 2. Douglas-Peucker simplification at 1% of the closed arc length
//! 3. linear pixel-to-degree projection over the viewport
//! 4. ring closure (at least 4 points, first == last)
//! 5. shoelace area scaled by a per-request m²/pixel factor
//! 6. size classification
//! 7. feature assembly
//!
//! Degenerate instances are dropped silently; an empty result is valid.
//!
//! ## Quick Start
//!
//! ```rust
//! use field_boundary::{Pipeline, DetectionRequest};
//!
//! let request = DetectionRequest::from_json(r#"{
//!     "image_width": 100,
//!     "image_height": 100,
//!     "bounds": {"north": 10, "south": 0, "east": 10, "west": 0},
//!     "instances": [{"polygon": [[0, 0], [50, 0], [50, 50], [0, 50]]}]
//! }"#)?;
//!
//! let pipeline = Pipeline::builder().build();
//! let traced = pipeline.process_request(&request)?;
//! let geojson = traced.to_geojson()?;
//! assert_eq!(geojson.features.len(), 1);
//! # Ok::<(), field_boundary::BoundaryError>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust
//! use field_boundary::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .set_simplifier(FixedToleranceSimplifier { epsilon: 2.0 })
//!     .with_simplification_threshold(10)
//!     .with_closure_tolerance(0.0)
//!     .with_min_confidence(0.5)
//!     .build();
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod config;
pub mod request;
pub mod io;
pub mod tracer;
pub mod mcp;
pub mod typed_geojson;

// Re-exports for convenience
pub use error::{BoundaryError, Result};
pub use types::*;
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use config::PipelineConfig;
pub use request::{BoundsPayload, DetectionRequest, InstancePayload};
pub use io::geojson::{PathPolygon, PathsResponse};
pub use tracer::{BoundaryCommand, BoundaryTracer};
