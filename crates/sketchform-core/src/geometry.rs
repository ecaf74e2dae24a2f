//! Planar geometry helpers shared by the vision and formation crates.
//!
//! Pixel-space quantities (contours, polygon vertices) use `Point2<i32>`;
//! everything in a formation frame uses `Point2<f64>`.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Axis-aligned bounding box in floating coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBox {
    /// Bounding box of a point set, `None` for an empty set.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Larger of width and height.
    #[inline]
    pub fn max_side(&self) -> f64 {
        self.width().max(self.height())
    }
}

/// Upright integer rectangle enclosing a pixel contour.
///
/// Width and height count pixels inclusively, so a single pixel has a
/// 1×1 rectangle and the aspect ratio is always finite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn enclosing(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0) as u32 + 1,
            height: (y1 - y0) as u32 + 1,
        })
    }

    /// Longer side divided by shorter side (>= 1).
    pub fn aspect_ratio(&self) -> f64 {
        let w = self.width.max(1) as f64;
        let h = self.height.max(1) as f64;
        w.max(h) / w.min(h)
    }
}

/// Unsigned polygon area via the shoelace formula.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    twice.abs() as f64 * 0.5
}

/// Length of the closed polyline through `points`.
pub fn closed_perimeter(points: &[Point2<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let a = points[i].cast::<f64>();
            let b = points[(i + 1) % n].cast::<f64>();
            (b - a).norm()
        })
        .sum()
}

/// `4π·area / perimeter²`; 1.0 for a perfect circle, 0.0 for a degenerate perimeter.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 || !perimeter.is_finite() {
        return 0.0;
    }
    4.0 * PI * area / (perimeter * perimeter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_i32(side: i32) -> Vec<Point2<i32>> {
        vec![
            Point2::new(0, 0),
            Point2::new(side, 0),
            Point2::new(side, side),
            Point2::new(0, side),
        ]
    }

    #[test]
    fn shoelace_area_ignores_orientation() {
        let mut pts = square_i32(10);
        assert_relative_eq!(polygon_area(&pts), 100.0);
        pts.reverse();
        assert_relative_eq!(polygon_area(&pts), 100.0);
    }

    #[test]
    fn degenerate_polygons_have_zero_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Point2::new(1, 1), Point2::new(5, 5)]), 0.0);
    }

    #[test]
    fn perimeter_closes_the_loop() {
        assert_relative_eq!(closed_perimeter(&square_i32(10)), 40.0);
        assert_eq!(closed_perimeter(&[Point2::new(3, 3)]), 0.0);
    }

    #[test]
    fn pixel_rect_is_inclusive() {
        let rect = PixelRect::enclosing(&[Point2::new(2, 3), Point2::new(11, 5)]).unwrap();
        assert_eq!(rect.width, 10);
        assert_eq!(rect.height, 3);
        assert_relative_eq!(rect.aspect_ratio(), 10.0 / 3.0);
    }

    #[test]
    fn bounding_box_center_and_sides() {
        let bb = BoundingBox::from_points(&[
            Point2::new(-1.0, 2.0),
            Point2::new(3.0, 8.0),
            Point2::new(0.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(bb.width(), 4.0);
        assert_relative_eq!(bb.height(), 6.0);
        assert_relative_eq!(bb.max_side(), 6.0);
        assert_relative_eq!(bb.center(), Point2::new(1.0, 5.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn circle_like_circularity_is_near_one() {
        let r = 50.0_f64;
        let c = circularity(PI * r * r, 2.0 * PI * r);
        assert_relative_eq!(c, 1.0, epsilon = 1e-12);
        assert_eq!(circularity(10.0, 0.0), 0.0);
    }
}
