//! Facial Landmark Geometry
//!
//! Derives the per-frame scalars consumed by the driver monitor from
//! 2D face-mesh landmarks:
//! - Eye Aspect Ratio (EAR) for eye closure
//! - Mouth Aspect Ratio (MAR) for yawning
//! - Horizontal iris position for gaze direction
//!
//! Degenerate geometry (zero-width eyes or mouth) never produces NaN:
//! the public helpers report a neutral value instead.

pub mod iris;
pub mod point;
pub mod ratios;

pub use iris::{iris_position, IrisConfig, IrisPosition};
pub use point::Point2;
pub use ratios::{eye_aspect_ratio, mean_eye_aspect_ratio, mouth_aspect_ratio, EyeLandmarks};

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate {0}: denominator is zero")]
    DegenerateDenominator(&'static str),

    #[error("Non-finite landmark coordinate in {0}")]
    NonFinite(&'static str),
}
