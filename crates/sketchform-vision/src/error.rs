/// Recoverable failures of the mask-to-polygon stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShapeDetectError {
    #[error("no contour found in mask")]
    NoContourFound,
    #[error("no contour passed the area/aspect filter (largest area {max_area:.1})")]
    ContourTooSmall { max_area: f64 },
    #[error("polygon approximation failed on a degenerate contour")]
    ApproximationFailed,
}

impl ShapeDetectError {
    /// Short tag reported in place of a shape label.
    pub fn failure_tag(&self) -> String {
        match self {
            ShapeDetectError::NoContourFound => "no_contours_found".to_string(),
            ShapeDetectError::ContourTooSmall { max_area } => {
                format!("too_small_max_{}", *max_area as i64)
            }
            ShapeDetectError::ApproximationFailed => "approximation_failed".to_string(),
        }
    }
}
