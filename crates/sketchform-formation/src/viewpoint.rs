use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use sketchform_core::BoundingBox;

/// Closest the camera gets to the formation center, meters.
pub const MIN_CAMERA_DISTANCE: f64 = 30.0;
/// Lowest camera height, meters.
pub const MIN_CAMERA_HEIGHT: f64 = 25.0;

/// Camera pose for watching a formation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    /// Centroid of the formation.
    pub target: Point2<f64>,
    /// Camera position; `z` is the height above ground.
    pub position: Point3<f64>,
    pub distance: f64,
    pub height: f64,
    /// Heading toward the centroid, degrees.
    pub yaw_deg: f64,
    /// Downward tilt, degrees.
    pub pitch_deg: f64,
}

/// Place a camera diagonally (45°) off the formation centroid, far and high
/// enough to keep the whole formation in view.
///
/// `altitude` is the formation altitude; only its magnitude is used.
/// Returns `None` for an empty formation.
pub fn observation_viewpoint(points: &[Point2<f64>], altitude: f64) -> Option<Viewpoint> {
    let bbox = BoundingBox::from_points(points)?;
    let n = points.len() as f64;
    let target = Point2::from(points.iter().map(|p| p.coords).sum::<nalgebra::Vector2<f64>>() / n);

    let size = bbox.max_side();
    let distance = MIN_CAMERA_DISTANCE.max(2.0 * size);
    let height = MIN_CAMERA_HEIGHT.max(altitude.abs() + 10.0);

    let angle = std::f64::consts::FRAC_PI_4;
    let cam = Point2::new(
        target.x + distance * angle.cos(),
        target.y + distance * angle.sin(),
    );
    let d = target - cam;
    let yaw_deg = d.y.atan2(d.x).to_degrees();
    let pitch_deg = (altitude.abs() + height).atan2(d.norm()).to_degrees();

    Some(Viewpoint {
        target,
        position: Point3::new(cam.x, cam.y, height),
        distance,
        height,
        yaw_deg,
        pitch_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn small_formation_uses_minimums() {
        let pts = [
            Point2::new(-5.0, -5.0),
            Point2::new(5.0, -5.0),
            Point2::new(5.0, 5.0),
            Point2::new(-5.0, 5.0),
        ];
        let v = observation_viewpoint(&pts, -15.0).unwrap();
        assert_abs_diff_eq!(v.target.x, 0.0);
        assert_abs_diff_eq!(v.distance, 30.0);
        assert_abs_diff_eq!(v.height, 25.0);
        let c = 30.0 / 2f64.sqrt();
        assert_abs_diff_eq!(v.position.x, c, epsilon = 1e-9);
        assert_abs_diff_eq!(v.position.y, c, epsilon = 1e-9);
        assert_abs_diff_eq!(v.yaw_deg, -135.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.pitch_deg, 40f64.atan2(30.0).to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn large_formation_backs_off() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(40.0, 10.0)];
        let v = observation_viewpoint(&pts, 30.0).unwrap();
        assert_abs_diff_eq!(v.target.x, 20.0);
        assert_abs_diff_eq!(v.target.y, 5.0);
        assert_abs_diff_eq!(v.distance, 80.0);
        assert_abs_diff_eq!(v.height, 40.0);
    }

    #[test]
    fn empty_formation_has_no_view() {
        assert!(observation_viewpoint(&[], 10.0).is_none());
    }
}
