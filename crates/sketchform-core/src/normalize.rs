//! Rescale a drawn point set into a formation frame.
//!
//! The larger side of the input bounding box is mapped onto `target_size`
//! with a single uniform scale, so the drawing keeps its aspect ratio.
//! Optionally the result is translated so its bounding box is centered on
//! the origin. Point order is preserved.

use log::debug;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    /// Length of the larger bounding-box side after scaling (formation units).
    pub target_size: f64,
    /// Translate the result so its bounding box is centered at (0, 0).
    pub center_at_origin: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            target_size: 20.0,
            center_at_origin: true,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("target size must be positive and finite (got {0})")]
    InvalidTargetSize(f64),
}

/// Scale (and optionally center) `points` so the larger bounding-box side
/// equals `params.target_size`.
///
/// A zero width or height is clamped to 1 before computing the scale, so a
/// single point or a perfectly straight line is still mapped without
/// dividing by zero. Empty input yields empty output.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(points), fields(points = points.len()))
)]
pub fn normalize_points(
    points: &[Point2<f64>],
    params: &NormalizeParams,
) -> Result<Vec<Point2<f64>>, NormalizeError> {
    let target = params.target_size;
    if !(target.is_finite() && target > 0.0) {
        return Err(NormalizeError::InvalidTargetSize(target));
    }
    let Some(bbox) = BoundingBox::from_points(points) else {
        return Ok(Vec::new());
    };

    let width = clamp_extent(bbox.width());
    let height = clamp_extent(bbox.height());
    let scale = target / width.max(height);

    let mut out: Vec<Point2<f64>> = points.iter().map(|p| Point2::from(p.coords * scale)).collect();

    if params.center_at_origin {
        if let Some(scaled) = BoundingBox::from_points(&out) {
            let shift: Vector2<f64> = scaled.center().coords;
            for p in &mut out {
                *p -= shift;
            }
        }
    }

    debug!(
        "normalized {} points: bounds ({:.1}, {:.1})..({:.1}, {:.1}), size {:.1}x{:.1}, scale {:.4}, target {}",
        out.len(),
        bbox.min.x,
        bbox.min.y,
        bbox.max.x,
        bbox.max.y,
        width,
        height,
        scale,
        target
    );

    Ok(out)
}

/// Convenience wrapper for integer pixel vertices.
pub fn normalize_pixels(
    points: &[Point2<i32>],
    params: &NormalizeParams,
) -> Result<Vec<Point2<f64>>, NormalizeError> {
    let as_f64: Vec<Point2<f64>> = points.iter().map(|p| p.cast::<f64>()).collect();
    normalize_points(&as_f64, params)
}

#[inline]
fn clamp_extent(extent: f64) -> f64 {
    if extent == 0.0 {
        1.0
    } else {
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params(target_size: f64, center_at_origin: bool) -> NormalizeParams {
        NormalizeParams {
            target_size,
            center_at_origin,
        }
    }

    fn dist(a: Point2<f64>, b: Point2<f64>) -> f64 {
        (a - b).norm()
    }

    #[test]
    fn drawn_square_maps_to_centered_target() {
        let drawn = [
            Point2::new(100, 100),
            Point2::new(200, 100),
            Point2::new(200, 200),
            Point2::new(100, 200),
        ];
        let out = normalize_pixels(&drawn, &params(15.0, true)).unwrap();
        assert_eq!(out.len(), 4);

        let bb = BoundingBox::from_points(&out).unwrap();
        assert_abs_diff_eq!(bb.max_side(), 15.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bb.center().x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bb.center().y, 0.0, epsilon = 1e-6);

        // Order preserved: first drawn corner is the top-left one.
        assert_abs_diff_eq!(out[0].x, -7.5, epsilon = 1e-9);
        assert_abs_diff_eq!(out[0].y, -7.5, epsilon = 1e-9);

        // Adjacent sides equal, diagonals equal.
        let sides: Vec<f64> = (0..4).map(|i| dist(out[i], out[(i + 1) % 4])).collect();
        for s in &sides {
            assert_abs_diff_eq!(*s, 15.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(dist(out[0], out[2]), dist(out[1], out[3]), epsilon = 1e-9);
    }

    #[test]
    fn larger_side_equals_target_for_wide_shapes() {
        let pts = [
            Point2::new(3.0, 1.0),
            Point2::new(43.0, 6.0),
            Point2::new(13.0, 11.0),
        ];
        let out = normalize_points(&pts, &params(20.0, false)).unwrap();
        let bb = BoundingBox::from_points(&out).unwrap();
        assert_abs_diff_eq!(bb.width(), 20.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bb.height(), 5.0, epsilon = 1e-6);
        // Without centering the scale is applied about the input origin.
        assert_abs_diff_eq!(out[0].x, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(normalize_points(&[], &NormalizeParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn degenerate_extent_is_clamped() {
        let single = normalize_points(&[Point2::new(5.0, 5.0)], &params(10.0, true)).unwrap();
        assert_abs_diff_eq!(single[0].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(single[0].y, 0.0, epsilon = 1e-12);

        let vertical = [Point2::new(2.0, 0.0), Point2::new(2.0, 4.0)];
        let out = normalize_points(&vertical, &params(8.0, true)).unwrap();
        let bb = BoundingBox::from_points(&out).unwrap();
        assert_abs_diff_eq!(bb.height(), 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.width(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_non_positive_target() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert_eq!(
            normalize_points(&pts, &params(0.0, true)),
            Err(NormalizeError::InvalidTargetSize(0.0))
        );
        assert!(normalize_points(&pts, &params(f64::NAN, true)).is_err());
    }

    #[test]
    fn default_params_target_twenty_centered() {
        let p = NormalizeParams::default();
        assert_eq!(p.target_size, 20.0);
        assert!(p.center_at_origin);
        let parsed: NormalizeParams = serde_json::from_str(r#"{"target_size": 12.5}"#).unwrap();
        assert_eq!(parsed.target_size, 12.5);
        assert!(parsed.center_at_origin);
    }
}
