use log::info;
use serde::{Deserialize, Serialize};
use sketchform_core::{classify_shape, ShapeFeatures, ShapeLabel};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::approx::{PolygonApproximation, PolygonApproximator};
use crate::contour::{Contour, ContourExtractor};
use crate::error::ShapeDetectError;
use crate::mask::BinaryMask;
use crate::params::ShapeDetectorParams;

/// Everything measured while labeling the primary contour of a mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeDetection {
    pub contour: Contour,
    /// Contours that passed the area/aspect filter.
    pub candidate_count: usize,
    pub features: ShapeFeatures,
    pub polygon: PolygonApproximation,
    pub label: ShapeLabel,
}

impl ShapeDetection {
    pub fn vertices(&self) -> &[nalgebra::Point2<i32>] {
        &self.polygon.vertices
    }
}

/// Mask -> contour -> stable polygon -> label.
#[derive(Clone, Debug, Default)]
pub struct ShapeDetector {
    extractor: ContourExtractor,
    approximator: PolygonApproximator,
}

impl ShapeDetector {
    pub fn new(params: ShapeDetectorParams) -> Self {
        Self {
            extractor: ContourExtractor::new(params.contour),
            approximator: PolygonApproximator::new(params.approximation),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, mask), fields(width = mask.width(), height = mask.height()))
    )]
    pub fn detect(&self, mask: &BinaryMask) -> Result<ShapeDetection, ShapeDetectError> {
        let selection = self.extractor.extract(mask)?;
        let candidate_count = selection.candidate_count();
        let contour = selection.into_primary();

        let polygon = self.approximator.approximate(&contour)?;
        let features = ShapeFeatures {
            vertex_count: polygon.vertex_count(),
            area: contour.area,
            perimeter: polygon.perimeter,
            aspect_ratio: contour.aspect_ratio(),
        };
        let label = classify_shape(&features);

        info!(
            "detected {label}: {} vertices, area {:.0}, aspect {:.2}, circularity {:.3}",
            features.vertex_count,
            features.area,
            features.aspect_ratio,
            features.circularity()
        );

        Ok(ShapeDetection {
            contour,
            candidate_count,
            features,
            polygon,
            label,
        })
    }
}
