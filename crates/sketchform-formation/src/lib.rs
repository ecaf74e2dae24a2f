//! Placing agents on a formation.
//!
//! Canonical formations come from [`generate_formation`]; detected shapes
//! arrive as normalized points from the vision side. Either way,
//! [`plan_dispatch`] pairs current agent positions with the targets through
//! an [`AssignmentStrategy`], and [`FlightArea`] / [`observation_viewpoint`]
//! cover the geographic and camera side.

mod assign;
mod dispatch;
mod flight_area;
mod generate;
mod viewpoint;

pub use assign::{reorder_targets, total_travel, Assignment, AssignmentStrategy, GreedyAssignment};
pub use dispatch::{plan_dispatch, AgentTarget, DispatchPlan};
pub use flight_area::{FlightArea, Waypoint, METERS_PER_DEGREE};
pub use generate::{generate_formation, FormationError, FormationShape};
pub use viewpoint::{observation_viewpoint, Viewpoint, MIN_CAMERA_DISTANCE, MIN_CAMERA_HEIGHT};
