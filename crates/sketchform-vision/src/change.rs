//! Foreground mask from a canvas capture and an optional clean background.
//!
//! With a background reference the detector thresholds the per-pixel
//! grayscale difference, opens then closes the result with a square
//! structuring element, and finally drops any remaining region whose
//! contour area does not exceed `min_region_area`. Without a reference it
//! falls back to marking dark pixels as ink.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::{close, open};
use imageproc::point::Point;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::contour::external_contours;
use crate::mask::{BinaryMask, FOREGROUND};
use crate::params::ChangeDetectorParams;

/// Clean canvas captured before drawing.
#[derive(Clone, Debug)]
pub struct BackgroundReference {
    image: RgbImage,
    gray: GrayImage,
}

impl BackgroundReference {
    pub fn new(image: RgbImage) -> Self {
        let gray = imageops::grayscale(&image);
        Self { image, gray }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// How clean a captured background looks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundQuality {
    /// Fraction of pixels brighter than the configured white level.
    pub white_fraction: f64,
    /// `white_fraction` reaches the configured minimum.
    pub acceptable: bool,
}

/// Background and capture sizes differed; the background was resampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionMismatch {
    pub background: (u32, u32),
    pub current: (u32, u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// No background reference: dark pixels are foreground.
    Threshold,
    /// Difference against the stored background.
    Difference,
}

/// Output of [`ChangeDetector::detect`].
#[derive(Clone, Debug)]
pub struct ChangeDetection {
    pub mask: BinaryMask,
    pub mode: DetectionMode,
    /// Set when the background had to be resized to the capture.
    pub background_resized: Option<DimensionMismatch>,
}

/// Change detector owning the background reference of a capture session.
///
/// `detect` only reads the reference; `capture_background` and `reset`
/// need exclusive access, so a shared detector is naturally serialized by
/// the borrow checker (or by a `RwLock` when shared across threads).
#[derive(Clone, Debug, Default)]
pub struct ChangeDetector {
    params: ChangeDetectorParams,
    background: Option<BackgroundReference>,
}

impl ChangeDetector {
    pub fn new(params: ChangeDetectorParams) -> Self {
        Self {
            params,
            background: None,
        }
    }

    pub fn params(&self) -> &ChangeDetectorParams {
        &self.params
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn background(&self) -> Option<&BackgroundReference> {
        self.background.as_ref()
    }

    /// Store `image` as the clean background, replacing any previous one.
    ///
    /// The capture is always kept; a low white fraction is only reported.
    pub fn capture_background(&mut self, image: RgbImage) -> BackgroundQuality {
        let reference = BackgroundReference::new(image);
        let quality = assess_background(reference.gray(), &self.params);
        if quality.acceptable {
            debug!(
                "background captured ({}x{}), {:.1}% white",
                reference.dimensions().0,
                reference.dimensions().1,
                quality.white_fraction * 100.0
            );
        } else {
            warn!(
                "background only {:.1}% white; overlapping windows or UI may be captured",
                quality.white_fraction * 100.0
            );
        }
        self.background = Some(reference);
        quality
    }

    /// Forget the background reference.
    pub fn reset(&mut self) {
        self.background = None;
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, current), fields(width = current.width(), height = current.height()))
    )]
    pub fn detect(&self, current: &RgbImage) -> ChangeDetection {
        let gray = imageops::grayscale(current);
        match &self.background {
            None => {
                debug!("no background reference, thresholding dark pixels");
                ChangeDetection {
                    mask: threshold_dark(&gray, self.params.fallback_threshold),
                    mode: DetectionMode::Threshold,
                    background_resized: None,
                }
            }
            Some(reference) => {
                let (mask, background_resized) = self.difference_mask(&gray, reference);
                ChangeDetection {
                    mask,
                    mode: DetectionMode::Difference,
                    background_resized,
                }
            }
        }
    }

    fn difference_mask(
        &self,
        gray: &GrayImage,
        reference: &BackgroundReference,
    ) -> (BinaryMask, Option<DimensionMismatch>) {
        let (w, h) = gray.dimensions();
        let mut mismatch = None;
        let resized;
        let background = if reference.gray().dimensions() != (w, h) {
            let m = DimensionMismatch {
                background: reference.dimensions(),
                current: (w, h),
            };
            warn!(
                "background {}x{} differs from capture {}x{}, resizing background",
                m.background.0, m.background.1, w, h
            );
            mismatch = Some(m);
            resized = imageops::resize(reference.gray(), w, h, FilterType::Triangle);
            &resized
        } else {
            reference.gray()
        };

        let threshold = self.params.diff_threshold;
        let raw = GrayImage::from_fn(w, h, |x, y| {
            let d = gray.get_pixel(x, y).0[0].abs_diff(background.get_pixel(x, y).0[0]);
            Luma([if d > threshold { FOREGROUND } else { 0 }])
        });

        let k = self.params.morph_radius;
        let cleaned = close(&open(&raw, Norm::LInf, k), Norm::LInf, k);
        let mask = remove_small_regions(&cleaned, self.params.min_region_area);
        debug!(
            "difference mask: {} raw, {} after cleanup",
            raw.pixels().filter(|p| p.0[0] != 0).count(),
            mask.foreground_count()
        );
        (mask, mismatch)
    }
}

/// Pixels at or below `level` become foreground.
pub fn threshold_dark(gray: &GrayImage, level: u8) -> BinaryMask {
    BinaryMask::from_fn(gray.width(), gray.height(), |x, y| {
        gray.get_pixel(x, y).0[0] <= level
    })
}

/// Redraw only the external regions whose contour area exceeds `min_area`,
/// filled.
pub fn remove_small_regions(image: &GrayImage, min_area: f64) -> BinaryMask {
    let mut out = GrayImage::new(image.width(), image.height());
    for contour in external_contours(image) {
        if contour.area <= min_area {
            continue;
        }
        let mut poly: Vec<Point<i32>> = contour.points.iter().map(|p| Point::new(p.x, p.y)).collect();
        while poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() < 3 {
            continue;
        }
        draw_polygon_mut(&mut out, &poly, Luma([FOREGROUND]));
    }
    BinaryMask::from_gray(out)
}

fn assess_background(gray: &GrayImage, params: &ChangeDetectorParams) -> BackgroundQuality {
    let total = gray.as_raw().len();
    let white = gray
        .as_raw()
        .iter()
        .filter(|&&v| v > params.background_white_level)
        .count();
    let white_fraction = if total == 0 {
        0.0
    } else {
        white as f64 / total as f64
    };
    BackgroundQuality {
        white_fraction,
        acceptable: white_fraction >= params.min_background_white_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const INK: Rgb<u8> = Rgb([20, 20, 20]);

    fn canvas(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, WHITE)
    }

    fn paint_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, INK);
            }
        }
    }

    #[test]
    fn fallback_marks_dark_pixels() {
        let mut img = canvas(50, 50);
        paint_rect(&mut img, 10, 10, 20, 20);
        img.put_pixel(40, 40, Rgb([230, 230, 230]));
        img.put_pixel(41, 40, Rgb([231, 231, 231]));

        let det = ChangeDetector::default().detect(&img);
        assert_eq!(det.mode, DetectionMode::Threshold);
        assert!(det.background_resized.is_none());
        assert_eq!(det.mask.dimensions(), (50, 50));
        assert!(det.mask.is_foreground(15, 15));
        assert!(det.mask.is_foreground(40, 40));
        assert!(!det.mask.is_foreground(41, 40));
        assert_eq!(det.mask.foreground_count(), 101);
    }

    #[test]
    fn difference_keeps_drawing_and_drops_speckles() {
        let background = canvas(120, 120);
        let mut current = canvas(120, 120);
        paint_rect(&mut current, 30, 30, 90, 90);
        // Isolated speckle: removed by the opening.
        current.put_pixel(5, 5, INK);
        // 6×6 dot: survives morphology but its area is below the floor.
        paint_rect(&mut current, 100, 100, 106, 106);

        let mut detector = ChangeDetector::default();
        detector.capture_background(background);
        let det = detector.detect(&current);

        assert_eq!(det.mode, DetectionMode::Difference);
        assert!(det.mask.is_foreground(60, 60));
        assert!(det.mask.is_foreground(30, 30));
        assert!(!det.mask.is_foreground(5, 5));
        assert!(!det.mask.is_foreground(102, 102));
        assert_eq!(det.mask.foreground_count(), 60 * 60);
    }

    #[test]
    fn small_differences_are_ignored() {
        let background = canvas(40, 40);
        let mut current = canvas(40, 40);
        paint_rect(&mut current, 5, 5, 35, 35);
        for p in current.pixels_mut() {
            if p.0[0] == INK.0[0] {
                *p = Rgb([240, 240, 240]);
            }
        }
        let mut detector = ChangeDetector::default();
        detector.capture_background(background);
        assert_eq!(detector.detect(&current).mask.foreground_count(), 0);
    }

    #[test]
    fn mismatched_background_is_resized_not_replaced() {
        let mut detector = ChangeDetector::default();
        detector.capture_background(canvas(60, 40));
        let mut current = canvas(120, 80);
        paint_rect(&mut current, 20, 20, 70, 60);

        let det = detector.detect(&current);
        assert_eq!(
            det.background_resized,
            Some(DimensionMismatch {
                background: (60, 40),
                current: (120, 80),
            })
        );
        assert_eq!(det.mask.dimensions(), (120, 80));
        assert!(det.mask.is_foreground(40, 40));
        // Stored reference untouched.
        assert_eq!(detector.background().unwrap().dimensions(), (60, 40));
    }

    #[test]
    fn outlines_are_filled() {
        let background = canvas(100, 100);
        let mut current = canvas(100, 100);
        paint_rect(&mut current, 20, 20, 80, 24);
        paint_rect(&mut current, 20, 76, 80, 80);
        paint_rect(&mut current, 20, 20, 24, 80);
        paint_rect(&mut current, 76, 20, 80, 80);

        let mut detector = ChangeDetector::default();
        detector.capture_background(background);
        let det = detector.detect(&current);
        assert!(det.mask.is_foreground(50, 50));
        assert_eq!(det.mask.foreground_count(), 60 * 60);
    }

    #[test]
    fn background_quality_and_lifecycle() {
        let mut detector = ChangeDetector::default();
        assert!(!detector.has_background());

        let q = detector.capture_background(canvas(10, 10));
        assert!(q.acceptable);
        assert_eq!(q.white_fraction, 1.0);
        assert!(detector.has_background());

        let mut cluttered = canvas(10, 10);
        paint_rect(&mut cluttered, 0, 0, 10, 4);
        let q = detector.capture_background(cluttered);
        assert!(!q.acceptable);
        assert!((q.white_fraction - 0.6).abs() < 1e-12);
        assert!(detector.has_background());

        detector.reset();
        assert!(!detector.has_background());
        assert_eq!(
            detector.detect(&canvas(10, 10)).mode,
            DetectionMode::Threshold
        );
    }
}
