//! External boundary extraction and candidate filtering.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use sketchform_core::{closed_perimeter, polygon_area, PixelRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::ShapeDetectError;
use crate::mask::BinaryMask;
use crate::params::ContourFilterParams;

/// Closed boundary of a foreground region, in pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Boundary pixels in traversal order; the closing edge is implicit.
    pub points: Vec<Point2<i32>>,
    /// Enclosed (shoelace) area.
    pub area: f64,
    /// Upright bounding rectangle.
    pub rect: PixelRect,
}

impl Contour {
    pub fn from_points(points: Vec<Point2<i32>>) -> Self {
        let area = polygon_area(&points);
        let rect = PixelRect::enclosing(&points).unwrap_or(PixelRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        });
        Self { points, area, rect }
    }

    pub fn perimeter(&self) -> f64 {
        closed_perimeter(&self.points)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.rect.aspect_ratio()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outermost boundaries of every foreground region (holes and nested
/// islands are skipped).
pub fn external_contours(image: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(image)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::from_points(c.points.iter().map(|p| Point2::new(p.x, p.y)).collect()))
        .collect()
}

/// Surviving candidates, largest first. Always holds at least the primary
/// contour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourSelection {
    primary: Contour,
    others: Vec<Contour>,
    rejected: usize,
}

impl ContourSelection {
    /// Sort `candidates` by area (descending, stable) and split off the
    /// largest. `None` when there is nothing to select.
    pub fn from_candidates(mut candidates: Vec<Contour>, rejected: usize) -> Option<Self> {
        candidates.sort_by(|a, b| {
            b.area
                .partial_cmp(&a.area)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut iter = candidates.into_iter();
        let primary = iter.next()?;
        Some(Self {
            primary,
            others: iter.collect(),
            rejected,
        })
    }

    pub fn primary(&self) -> &Contour {
        &self.primary
    }

    pub fn into_primary(self) -> Contour {
        self.primary
    }

    /// All candidates, primary first.
    pub fn candidates(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.primary).chain(&self.others)
    }

    /// Number of candidates, at least 1.
    pub fn candidate_count(&self) -> usize {
        1 + self.others.len()
    }

    /// Number of external boundaries removed by the filter.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// Picks the drawn shape out of a change mask.
#[derive(Clone, Debug, Default)]
pub struct ContourExtractor {
    params: ContourFilterParams,
}

impl ContourExtractor {
    pub fn new(params: ContourFilterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ContourFilterParams {
        &self.params
    }

    fn accepts(&self, contour: &Contour) -> bool {
        contour.area > self.params.min_area && contour.aspect_ratio() < self.params.max_aspect_ratio
    }

    /// Extract external boundaries, drop small or line-like ones, and sort
    /// the rest by area (descending, stable).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn extract(&self, mask: &BinaryMask) -> Result<ContourSelection, ShapeDetectError> {
        let all = external_contours(mask.as_image());
        if all.is_empty() {
            return Err(ShapeDetectError::NoContourFound);
        }

        let total = all.len();
        let max_area = all.iter().map(|c| c.area).fold(0.0_f64, f64::max);

        let candidates: Vec<Contour> = all.into_iter().filter(|c| self.accepts(c)).collect();
        let rejected = total - candidates.len();
        let Some(selection) = ContourSelection::from_candidates(candidates, rejected) else {
            warn!(
                "largest contour area {max_area:.1}, minimum {:.1}",
                self.params.min_area
            );
            return Err(ShapeDetectError::ContourTooSmall { max_area });
        };

        debug!(
            "{} of {total} contours valid, primary area {:.1}",
            selection.candidate_count(),
            selection.primary().area
        );
        Ok(selection)
    }
}
