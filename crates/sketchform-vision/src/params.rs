use serde::{Deserialize, Serialize};

/// Change detection between a clean background and the drawn-on canvas.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChangeDetectorParams {
    /// Without a background, grayscale values at or below this are ink.
    pub fallback_threshold: u8,
    /// Grayscale difference above which a pixel counts as changed.
    pub diff_threshold: u8,
    /// Radius of the square structuring element (1 => 3×3).
    pub morph_radius: u8,
    /// Regions whose contour area is at or below this are dropped as noise.
    pub min_region_area: f64,
    /// Grayscale level above which a background pixel counts as white.
    pub background_white_level: u8,
    /// Minimal white fraction for a background to be considered clean.
    pub min_background_white_fraction: f64,
}

impl Default for ChangeDetectorParams {
    fn default() -> Self {
        Self {
            fallback_threshold: 230,
            diff_threshold: 20,
            morph_radius: 1,
            min_region_area: 50.0,
            background_white_level: 240,
            min_background_white_fraction: 0.70,
        }
    }
}

/// Filters applied to candidate boundaries.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContourFilterParams {
    /// Contours must enclose strictly more than this area.
    pub min_area: f64,
    /// Contours must have a bounding-box aspect ratio strictly below this.
    pub max_aspect_ratio: f64,
}

impl Default for ContourFilterParams {
    fn default() -> Self {
        Self {
            min_area: 300.0,
            max_aspect_ratio: 10.0,
        }
    }
}

/// Approximation strengths voted over by the polygon approximator.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApproximationParams {
    /// Epsilon factors in increasing order; each is multiplied by the
    /// contour perimeter to obtain an absolute tolerance.
    pub epsilon_factors: Vec<f64>,
}

impl Default for ApproximationParams {
    fn default() -> Self {
        Self {
            epsilon_factors: vec![0.010, 0.015, 0.020, 0.025, 0.030, 0.035, 0.040],
        }
    }
}

/// Configuration of the mask-to-label stage.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShapeDetectorParams {
    pub contour: ContourFilterParams,
    pub approximation: ApproximationParams,
}
