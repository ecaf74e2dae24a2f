//! Turn a freehand drawing into a formation for a group of agents.
//!
//! This crate provides:
//! - re-exports of the workspace crates (`core`, `vision`, `formation`)
//! - end-to-end helpers that run change detection, shape detection and
//!   normalization on an `image::RgbImage` or a raw RGB buffer
//! - [`DrawingSession`] for repeated captures of the same canvas
//!
//! ## Quickstart
//!
//! ```no_run
//! use sketchform::detect::detect_formation;
//! use sketchform::vision::ChangeDetector;
//! use sketchform::PipelineConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let mut change = ChangeDetector::new(config.change.clone());
//! change.capture_background(image::open("blank.png")?.to_rgb8());
//!
//! let canvas = image::open("drawing.png")?.to_rgb8();
//! let (_mask, result) = detect_formation(&change, &canvas, &config);
//! let found = result?;
//! println!("{}: {:?}", found.formation.label, found.formation.points);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `sketchform::core`: geometry, shape labels, normalization, logging.
//! - `sketchform::vision`: change detection, contours, polygon approximation.
//! - `sketchform::formation`: canonical formations, assignment, dispatch,
//!   flight-area waypoints, camera viewpoint.
//! - `sketchform::detect`: end-to-end helpers.

pub use sketchform_core as core;
pub use sketchform_formation as formation;
pub use sketchform_vision as vision;

pub use sketchform_core::{NormalizeParams, ShapeLabel};
pub use sketchform_formation::{AssignmentStrategy, FlightArea, GreedyAssignment};
pub use sketchform_vision::{ChangeDetector, ShapeDetectError, ShapeDetector};

mod config;
pub mod detect;
mod session;

pub use config::{ConfigError, PipelineConfig};
pub use detect::{DetectError, DetectedFormation, Formation};
pub use session::{DrawingSession, SessionOutcome};
