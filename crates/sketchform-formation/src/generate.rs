//! Canonical point sets for named formations.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use sketchform_core::ShapeLabel;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormationError {
    #[error("formation size must be positive and finite (got {0})")]
    InvalidSize(f64),
    #[error("unknown formation shape `{0}`")]
    UnknownShape(String),
}

/// Shapes the generator knows how to lay out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationShape {
    Triangle,
    Square,
    Pentagon,
    Hexagon,
    Circle,
    Line,
}

impl FormationShape {
    /// Parse a shape name; anything unrecognized becomes [`FormationShape::Circle`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!("unknown formation `{name}`, using circle");
            FormationShape::Circle
        })
    }

    /// Natural vertex count, `None` for shapes taking any number of points.
    pub fn natural_count(self) -> Option<usize> {
        match self {
            FormationShape::Triangle => Some(3),
            FormationShape::Square => Some(4),
            FormationShape::Pentagon => Some(5),
            FormationShape::Hexagon => Some(6),
            FormationShape::Circle | FormationShape::Line => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormationShape::Triangle => "triangle",
            FormationShape::Square => "square",
            FormationShape::Pentagon => "pentagon",
            FormationShape::Hexagon => "hexagon",
            FormationShape::Circle => "circle",
            FormationShape::Line => "line",
        }
    }
}

impl fmt::Display for FormationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormationShape {
    type Err = FormationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" => Ok(FormationShape::Triangle),
            "square" => Ok(FormationShape::Square),
            "pentagon" => Ok(FormationShape::Pentagon),
            "hexagon" => Ok(FormationShape::Hexagon),
            "circle" => Ok(FormationShape::Circle),
            "line" => Ok(FormationShape::Line),
            _ => Err(FormationError::UnknownShape(s.to_string())),
        }
    }
}

impl From<ShapeLabel> for FormationShape {
    /// Closest canonical formation for a detected label.
    fn from(label: ShapeLabel) -> Self {
        match label {
            ShapeLabel::Line => FormationShape::Line,
            ShapeLabel::Triangle => FormationShape::Triangle,
            ShapeLabel::Square | ShapeLabel::Rectangle => FormationShape::Square,
            ShapeLabel::Pentagon => FormationShape::Pentagon,
            ShapeLabel::Hexagon => FormationShape::Hexagon,
            _ => FormationShape::Circle,
        }
    }
}

/// Lay out `count` points of `shape` with overall size `size`.
///
/// Regular polygons sit on a circle of radius `size / 2` starting at the top
/// (-90°) and never produce more points than they have vertices; a request
/// for zero points yields an empty list. The square
/// is its four corners, bottom-left first, counter-clockwise. The circle
/// starts at angle 0. The line runs along x from `-size / 2` to `size / 2`;
/// a single-point line is the origin.
pub fn generate_formation(
    shape: FormationShape,
    count: usize,
    size: f64,
) -> Result<Vec<Point2<f64>>, FormationError> {
    if !(size.is_finite() && size > 0.0) {
        return Err(FormationError::InvalidSize(size));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let half = size / 2.0;
    let points = match shape {
        FormationShape::Triangle | FormationShape::Pentagon | FormationShape::Hexagon => {
            let sides = shape.natural_count().unwrap_or(count);
            ring(half, sides, -FRAC_PI_2, count.min(sides))
        }
        FormationShape::Square => [(-half, -half), (half, -half), (half, half), (-half, half)]
            .into_iter()
            .take(count)
            .map(|(x, y)| Point2::new(x, y))
            .collect(),
        FormationShape::Circle => ring(half, count, 0.0, count),
        FormationShape::Line => {
            if count == 1 {
                vec![Point2::origin()]
            } else {
                let spacing = size / (count - 1) as f64;
                (0..count)
                    .map(|i| Point2::new(-half + i as f64 * spacing, 0.0))
                    .collect()
            }
        }
    };
    debug!("{shape} formation: {} points, size {size}", points.len());
    Ok(points)
}

/// `take` points of a regular `sides`-gon of radius `radius`.
fn ring(radius: f64, sides: usize, offset: f64, take: usize) -> Vec<Point2<f64>> {
    (0..take)
        .map(|i| {
            let angle = offset + i as f64 * TAU / sides as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_points(actual: &[Point2<f64>], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, &(x, y)) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a.x, x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn square_corners_in_order() {
        let pts = generate_formation(FormationShape::Square, 4, 10.0).unwrap();
        assert_points(&pts, &[(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (-5.0, 5.0)]);

        let two = generate_formation(FormationShape::Square, 2, 10.0).unwrap();
        assert_points(&two, &[(-5.0, -5.0), (5.0, -5.0)]);

        assert_eq!(
            generate_formation(FormationShape::Square, 9, 10.0).unwrap().len(),
            4
        );
    }

    #[test]
    fn polygons_start_at_top_and_cap_count() {
        let tri = generate_formation(FormationShape::Triangle, 10, 20.0).unwrap();
        assert_eq!(tri.len(), 3);
        assert_abs_diff_eq!(tri[0].x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tri[0].y, -10.0, epsilon = 1e-9);

        let pent = generate_formation(FormationShape::Pentagon, 3, 20.0).unwrap();
        assert_eq!(pent.len(), 3);
        assert_abs_diff_eq!(pent[0].y, -10.0, epsilon = 1e-9);

        let hex = generate_formation(FormationShape::Hexagon, 6, 20.0).unwrap();
        assert_eq!(hex.len(), 6);
        assert_abs_diff_eq!(hex[0].y, -10.0, epsilon = 1e-9);
        for p in &hex {
            assert_abs_diff_eq!(p.coords.norm(), 10.0, epsilon = 1e-9);
        }
        // Adjacent vertices of a hexagon are one radius apart.
        assert_abs_diff_eq!((hex[1] - hex[0]).norm(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_starts_at_angle_zero() {
        let pts = generate_formation(FormationShape::Circle, 4, 8.0).unwrap();
        assert_points(&pts, &[(4.0, 0.0), (0.0, 4.0), (-4.0, 0.0), (0.0, -4.0)]);
    }

    #[test]
    fn line_spacing() {
        let pts = generate_formation(FormationShape::Line, 5, 20.0).unwrap();
        assert_points(
            &pts,
            &[(-10.0, 0.0), (-5.0, 0.0), (0.0, 0.0), (5.0, 0.0), (10.0, 0.0)],
        );
        let single = generate_formation(FormationShape::Line, 1, 20.0).unwrap();
        assert_points(&single, &[(0.0, 0.0)]);
    }

    #[test]
    fn unknown_names_fall_back_to_circle() {
        assert_eq!(FormationShape::from_name("star"), FormationShape::Circle);
        assert_eq!(FormationShape::from_name(" Hexagon "), FormationShape::Hexagon);
        let star = generate_formation(FormationShape::from_name("star"), 6, 10.0).unwrap();
        let circle = generate_formation(FormationShape::Circle, 6, 10.0).unwrap();
        assert_eq!(star, circle);
    }

    #[test]
    fn labels_map_to_formations() {
        assert_eq!(FormationShape::from(ShapeLabel::Rectangle), FormationShape::Square);
        assert_eq!(FormationShape::from(ShapeLabel::Octagon), FormationShape::Circle);
        assert_eq!(FormationShape::from(ShapeLabel::Line), FormationShape::Line);
    }

    #[test]
    fn zero_points_is_empty_for_every_shape() {
        for name in ["triangle", "square", "pentagon", "hexagon", "circle", "line"] {
            let shape = FormationShape::from_name(name);
            assert_eq!(generate_formation(shape, 0, 20.0), Ok(Vec::new()), "{name}");
        }
    }

    #[test]
    fn rejects_bad_size() {
        assert_eq!(
            generate_formation(FormationShape::Circle, 3, -1.0),
            Err(FormationError::InvalidSize(-1.0))
        );
        assert!(generate_formation(FormationShape::Line, 3, f64::NAN).is_err());
    }
}
