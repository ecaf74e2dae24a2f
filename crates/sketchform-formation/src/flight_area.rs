//! Screen-space vertices to flight-area waypoints.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use sketchform_core::BoundingBox;

/// Meters per degree of latitude (spherical approximation).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Rectangle on the ground the formation is flown in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightArea {
    pub center_lat: f64,
    pub center_lon: f64,
    pub width_meters: f64,
    pub height_meters: f64,
    pub altitude: f64,
}

impl Default for FlightArea {
    fn default() -> Self {
        Self {
            center_lat: 0.0,
            center_lon: 0.0,
            width_meters: 20.0,
            height_meters: 20.0,
            altitude: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// 1-based position in the input sequence.
    pub id: usize,
    pub screen: Point2<f64>,
    /// East/north offset from the area center, meters.
    pub flight: Point2<f64>,
    /// Latitude, longitude (degrees) and altitude.
    pub gps: Point3<f64>,
}

impl FlightArea {
    /// Stretch the shape's bounding box over the area and convert to GPS.
    ///
    /// Each axis is normalized independently to [-1, 1] around the bounding
    /// box center, so the aspect ratio is not preserved. Screen y grows
    /// downward and is flipped to point north.
    pub fn waypoints(&self, screen_points: &[Point2<f64>]) -> Vec<Waypoint> {
        let Some(bbox) = BoundingBox::from_points(screen_points) else {
            return Vec::new();
        };
        let center = bbox.center();
        let half_w = bbox.width() / 2.0;
        let half_h = bbox.height() / 2.0;
        let lon_scale = METERS_PER_DEGREE * self.center_lat.to_radians().cos();

        screen_points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let nx = if half_w > 0.0 { (p.x - center.x) / half_w } else { 0.0 };
                let ny = if half_h > 0.0 { (p.y - center.y) / half_h } else { 0.0 };
                let flight = Point2::new(
                    nx * self.width_meters / 2.0,
                    -ny * self.height_meters / 2.0,
                );
                let gps = Point3::new(
                    self.center_lat + flight.y / METERS_PER_DEGREE,
                    self.center_lon + flight.x / lon_scale,
                    self.altitude,
                );
                Waypoint {
                    id: i + 1,
                    screen: *p,
                    flight,
                    gps,
                }
            })
            .collect()
    }
}
