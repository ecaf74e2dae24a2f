//! Shape labels and the vertex/geometry rule table used to assign them.
//!
//! Classification is a pure lookup over [`SHAPE_RULES`]: the first rule whose
//! vertex-count range and geometric predicate both match wins.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::geometry::circularity;

/// Aspect ratio below which a 4-gon counts as a square.
pub const SQUARE_MAX_ASPECT: f64 = 1.2;
/// Circularity above which a polygon with 7+ vertices counts as a circle.
pub const CIRCLE_MIN_CIRCULARITY: f64 = 0.75;

/// Named shape assigned to a detected polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    Line,
    Triangle,
    Square,
    Rectangle,
    Pentagon,
    Hexagon,
    Circle,
    Heptagon,
    Octagon,
    /// Polygon with the given number of vertices (more than eight).
    Polygon(usize),
    Unknown,
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeLabel::Line => f.write_str("line"),
            ShapeLabel::Triangle => f.write_str("triangle"),
            ShapeLabel::Square => f.write_str("square"),
            ShapeLabel::Rectangle => f.write_str("rectangle"),
            ShapeLabel::Pentagon => f.write_str("pentagon"),
            ShapeLabel::Hexagon => f.write_str("hexagon"),
            ShapeLabel::Circle => f.write_str("circle"),
            ShapeLabel::Heptagon => f.write_str("heptagon"),
            ShapeLabel::Octagon => f.write_str("octagon"),
            ShapeLabel::Polygon(n) => write!(f, "polygon_{n}"),
            ShapeLabel::Unknown => f.write_str("unknown"),
        }
    }
}

/// Error returned when a string is not a shape label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized shape label `{0}`")]
pub struct ParseShapeLabelError(pub String);

impl FromStr for ShapeLabel {
    type Err = ParseShapeLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = match s.trim().to_ascii_lowercase().as_str() {
            "line" => ShapeLabel::Line,
            "triangle" => ShapeLabel::Triangle,
            "square" => ShapeLabel::Square,
            "rectangle" => ShapeLabel::Rectangle,
            "pentagon" => ShapeLabel::Pentagon,
            "hexagon" => ShapeLabel::Hexagon,
            "circle" => ShapeLabel::Circle,
            "heptagon" => ShapeLabel::Heptagon,
            "octagon" => ShapeLabel::Octagon,
            "unknown" => ShapeLabel::Unknown,
            other => other
                .strip_prefix("polygon_")
                .and_then(|n| n.parse::<usize>().ok())
                .map(ShapeLabel::Polygon)
                .ok_or_else(|| ParseShapeLabelError(s.to_string()))?,
        };
        Ok(label)
    }
}

impl Serialize for ShapeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inputs to the classifier, all measured on the primary contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeFeatures {
    /// Vertex count of the approximated polygon.
    pub vertex_count: usize,
    /// Enclosed contour area.
    pub area: f64,
    /// Closed contour perimeter.
    pub perimeter: f64,
    /// Bounding-box longer side over shorter side.
    pub aspect_ratio: f64,
}

impl ShapeFeatures {
    pub fn circularity(&self) -> f64 {
        circularity(self.area, self.perimeter)
    }
}

/// Which vertex counts a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexRange {
    Below(usize),
    Exactly(usize),
    AtLeast(usize),
}

impl VertexRange {
    pub fn contains(&self, n: usize) -> bool {
        match *self {
            VertexRange::Below(k) => n < k,
            VertexRange::Exactly(k) => n == k,
            VertexRange::AtLeast(k) => n >= k,
        }
    }
}

/// Geometric condition evaluated on [`ShapeFeatures`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapePredicate {
    Always,
    AspectBelow(f64),
    CircularityAbove(f64),
}

impl ShapePredicate {
    pub fn holds(&self, features: &ShapeFeatures) -> bool {
        match *self {
            ShapePredicate::Always => true,
            ShapePredicate::AspectBelow(limit) => features.aspect_ratio < limit,
            ShapePredicate::CircularityAbove(limit) => features.circularity() > limit,
        }
    }
}

/// One row of the classification table.
#[derive(Clone, Copy, Debug)]
pub struct ShapeRule {
    pub vertices: VertexRange,
    pub predicate: ShapePredicate,
    pub label: fn(usize) -> ShapeLabel,
}

/// Ordered classification table; the first matching row decides the label.
pub const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        vertices: VertexRange::Below(3),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Line,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(3),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Triangle,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(4),
        predicate: ShapePredicate::AspectBelow(SQUARE_MAX_ASPECT),
        label: |_| ShapeLabel::Square,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(4),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Rectangle,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(5),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Pentagon,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(6),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Hexagon,
    },
    ShapeRule {
        vertices: VertexRange::AtLeast(7),
        predicate: ShapePredicate::CircularityAbove(CIRCLE_MIN_CIRCULARITY),
        label: |_| ShapeLabel::Circle,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(7),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Heptagon,
    },
    ShapeRule {
        vertices: VertexRange::Exactly(8),
        predicate: ShapePredicate::Always,
        label: |_| ShapeLabel::Octagon,
    },
    ShapeRule {
        vertices: VertexRange::AtLeast(9),
        predicate: ShapePredicate::Always,
        label: ShapeLabel::Polygon,
    },
];

/// Label a polygon from its vertex count and contour geometry.
///
/// Returns [`ShapeLabel::Unknown`] only if no table row matches, which the
/// table above never allows.
pub fn classify_shape(features: &ShapeFeatures) -> ShapeLabel {
    SHAPE_RULES
        .iter()
        .find(|rule| rule.vertices.contains(features.vertex_count) && rule.predicate.holds(features))
        .map(|rule| (rule.label)(features.vertex_count))
        .unwrap_or(ShapeLabel::Unknown)
}
