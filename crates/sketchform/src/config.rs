//! Pipeline configuration as one JSON document.
//!
//! Every section and field is optional; missing values take the defaults of
//! the underlying parameter structs.
//!
//! ```json
//! {
//!   "change": { "diff_threshold": 25 },
//!   "shape": { "contour": { "min_area": 500.0 } },
//!   "normalize": { "target_size": 15.0 },
//!   "flight_area": { "center_lat": 47.64, "center_lon": -122.14 },
//!   "altitude": -15.0
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sketchform_core::NormalizeParams;
use sketchform_formation::FlightArea;
use sketchform_vision::{ChangeDetectorParams, ShapeDetectorParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub change: ChangeDetectorParams,
    pub shape: ShapeDetectorParams,
    pub normalize: NormalizeParams,
    pub flight_area: FlightArea,
    /// Altitude agents fly the formation at (NED: negative is up).
    pub altitude: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            change: ChangeDetectorParams::default(),
            shape: ShapeDetectorParams::default(),
            normalize: NormalizeParams::default(),
            flight_area: FlightArea::default(),
            altitude: -15.0,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
