use image::RgbImage;
use log::info;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::core::{normalize_pixels, NormalizeError, NormalizeParams, ShapeLabel};
use crate::vision::{
    BinaryMask, ChangeDetection, ChangeDetector, ShapeDetectError, ShapeDetection, ShapeDetector,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Shape(#[from] ShapeDetectError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl DetectError {
    /// Failure marker reported in place of a label, for shape failures.
    pub fn failure_tag(&self) -> Option<String> {
        match self {
            DetectError::Shape(e) => Some(e.failure_tag()),
            _ => None,
        }
    }
}

/// A labeled point set in the formation frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub label: ShapeLabel,
    /// Normalized polygon vertices, in contour order.
    pub points: Vec<Point2<f64>>,
}

impl Formation {
    /// Same label and pointwise equal within `tolerance`.
    pub fn matches(&self, other: &Formation, tolerance: f64) -> bool {
        self.label == other.label
            && self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }
}

/// Shape found on a canvas together with its normalized formation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedFormation {
    pub shape: ShapeDetection,
    pub formation: Formation,
}

/// Build an `image::RgbImage` from a raw interleaved RGB buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<RgbImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    if w == 0 || h == 0 {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    }
    let Some(expected) = w.checked_mul(h).and_then(|n| n.checked_mul(3)) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidRgbDimensions { width, height })
}

/// Label the shape in `mask` and normalize its vertices.
pub fn formation_from_mask(
    mask: &BinaryMask,
    detector: &ShapeDetector,
    normalize: &NormalizeParams,
) -> Result<DetectedFormation, DetectError> {
    let shape = detector.detect(mask)?;
    let points = normalize_pixels(shape.vertices(), normalize)?;
    let formation = Formation {
        label: shape.label,
        points,
    };
    Ok(DetectedFormation { shape, formation })
}

/// Run change detection, shape detection and normalization on one capture.
///
/// The change mask is returned alongside the result so callers can inspect
/// it even when shape detection fails.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = image.width(), height = image.height()))
)]
pub fn detect_formation(
    change: &ChangeDetector,
    image: &RgbImage,
    config: &PipelineConfig,
) -> (ChangeDetection, Result<DetectedFormation, DetectError>) {
    let detection = change.detect(image);
    let detector = ShapeDetector::new(config.shape.clone());
    let result = formation_from_mask(&detection.mask, &detector, &config.normalize);
    match &result {
        Ok(found) => info!(
            "{} with {} points",
            found.formation.label,
            found.formation.points.len()
        ),
        Err(e) => info!("no formation: {e}"),
    }
    (detection, result)
}

/// [`detect_formation`] on a raw RGB buffer, without a background.
pub fn detect_formation_from_rgb_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    config: &PipelineConfig,
) -> Result<DetectedFormation, DetectError> {
    let image = rgb_image_from_slice(width, height, pixels)?;
    let change = ChangeDetector::new(config.change.clone());
    detect_formation(&change, &image, config).1
}
