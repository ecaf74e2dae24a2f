//! Repeated captures of the same canvas.

use image::RgbImage;
use log::{debug, info};

use crate::config::PipelineConfig;
use crate::detect::{formation_from_mask, DetectError, Formation};
use crate::vision::{BackgroundQuality, ChangeDetector, ShapeDetector};

/// Points closer than this (formation units) count as unchanged.
const SAME_POINT_TOLERANCE: f64 = 1e-6;

/// Result of one [`DrawingSession::process`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOutcome {
    pub formation: Formation,
    /// Label or points differ from the previously accepted formation.
    pub changed: bool,
}

/// Owns the background reference and the last accepted formation of a
/// continuous capture loop.
#[derive(Clone, Debug)]
pub struct DrawingSession {
    config: PipelineConfig,
    change: ChangeDetector,
    detector: ShapeDetector,
    last: Option<Formation>,
}

impl DrawingSession {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            change: ChangeDetector::new(config.change.clone()),
            detector: ShapeDetector::new(config.shape.clone()),
            config,
            last: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn capture_background(&mut self, image: RgbImage) -> BackgroundQuality {
        self.change.capture_background(image)
    }

    /// Drop the background and forget the last formation.
    pub fn reset(&mut self) {
        self.change.reset();
        self.last = None;
    }

    pub fn has_background(&self) -> bool {
        self.change.has_background()
    }

    pub fn last_formation(&self) -> Option<&Formation> {
        self.last.as_ref()
    }

    /// Detect the current drawing. A failure leaves the last accepted
    /// formation in place.
    pub fn process(&mut self, image: &RgbImage) -> Result<SessionOutcome, DetectError> {
        let detection = self.change.detect(image);
        let found = formation_from_mask(&detection.mask, &self.detector, &self.config.normalize)?;
        let formation = found.formation;

        let changed = !self
            .last
            .as_ref()
            .is_some_and(|last| last.matches(&formation, SAME_POINT_TOLERANCE));
        if changed {
            info!("new formation: {}", formation.label);
        } else {
            debug!("formation unchanged ({})", formation.label);
        }
        self.last = Some(formation.clone());
        Ok(SessionOutcome { formation, changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ShapeLabel;
    use crate::vision::ShapeDetectError;
    use image::Rgb;

    fn canvas() -> RgbImage {
        RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]))
    }

    fn with_block(x0: u32, y0: u32, w: u32, h: u32) -> RgbImage {
        let mut img = canvas();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn reports_changes_between_captures() {
        let mut session = DrawingSession::new(PipelineConfig::default());
        session.capture_background(canvas());
        assert!(session.has_background());

        let first = session.process(&with_block(50, 50, 100, 100)).unwrap();
        assert!(first.changed);
        assert_eq!(first.formation.label, ShapeLabel::Square);

        let again = session.process(&with_block(50, 50, 100, 100)).unwrap();
        assert!(!again.changed);

        // Same square elsewhere normalizes to the same points.
        let moved = session.process(&with_block(20, 30, 100, 100)).unwrap();
        assert!(!moved.changed);

        let wide = session.process(&with_block(20, 60, 160, 60)).unwrap();
        assert!(wide.changed);
        assert_eq!(wide.formation.label, ShapeLabel::Rectangle);
    }

    #[test]
    fn failures_keep_last_formation() {
        let mut session = DrawingSession::new(PipelineConfig::default());
        session.capture_background(canvas());
        session.process(&with_block(50, 50, 100, 100)).unwrap();

        let err = session.process(&canvas()).unwrap_err();
        assert_eq!(err, DetectError::Shape(ShapeDetectError::NoContourFound));
        assert_eq!(
            session.last_formation().map(|f| f.label),
            Some(ShapeLabel::Square)
        );

        session.reset();
        assert!(session.last_formation().is_none());
        assert!(!session.has_background());
    }
}
