//! Image side of the sketch pipeline.
//!
//! - [`ChangeDetector`] turns a canvas capture (and an optional clean
//!   background it owns) into a [`BinaryMask`].
//! - [`ContourExtractor`] picks the drawn region out of the mask.
//! - [`PolygonApproximator`] reduces it to a vertex set chosen by majority vote
//!   over several Douglas-Peucker tolerances.
//! - [`ShapeDetector`] chains the last two with the label table from
//!   `sketchform-core`.

mod approx;
mod change;
mod contour;
mod detector;
mod error;
mod mask;
mod params;

pub use approx::{
    approximate_closed, select_stable_vote, PolygonApproximation, PolygonApproximator, VertexVote,
};
pub use change::{
    remove_small_regions, threshold_dark, BackgroundQuality, BackgroundReference, ChangeDetection,
    ChangeDetector, DetectionMode, DimensionMismatch,
};
pub use contour::{external_contours, Contour, ContourExtractor, ContourSelection};
pub use detector::{ShapeDetection, ShapeDetector};
pub use error::ShapeDetectError;
pub use mask::{BinaryMask, BACKGROUND, FOREGROUND};
pub use params::{
    ApproximationParams, ChangeDetectorParams, ContourFilterParams, ShapeDetectorParams,
};
