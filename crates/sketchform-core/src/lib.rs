//! Core types for turning a drawn shape into a formation.
//!
//! This crate is image-free: it holds the planar geometry helpers, the shape
//! label table and the coordinate normalizer. Image processing lives in
//! `sketchform-vision`, agent placement in `sketchform-formation`.

mod geometry;
mod logger;
mod normalize;
mod shape;

pub use nalgebra::Point2;

pub use geometry::{circularity, closed_perimeter, polygon_area, BoundingBox, PixelRect};
pub use normalize::{normalize_pixels, normalize_points, NormalizeError, NormalizeParams};
pub use shape::{
    classify_shape, ParseShapeLabelError, ShapeFeatures, ShapeLabel, ShapePredicate, ShapeRule,
    VertexRange, CIRCLE_MIN_CIRCULARITY, SHAPE_RULES, SQUARE_MAX_ASPECT,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, stage_of};
