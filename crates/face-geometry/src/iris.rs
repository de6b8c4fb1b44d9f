//! Horizontal gaze classification from iris placement

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Where the iris sits inside the eye opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IrisPosition {
    Left,
    #[default]
    Center,
    Right,
}

impl IrisPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Center => "CENTER",
            Self::Right => "RIGHT",
        }
    }
}

/// Iris ratio cutoffs (empirically tuned)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisConfig {
    /// Ratio below which the driver looks right
    pub right_below: f64,
    /// Ratio above which the driver looks left
    pub left_above: f64,
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            right_below: 0.42,
            left_above: 0.58,
        }
    }
}

/// Classify gaze from the x coordinates of the inner eye corner, outer eye
/// corner, and iris center. Zero eye width reports `Center`.
pub fn iris_position(inner_x: f64, outer_x: f64, iris_x: f64, config: &IrisConfig) -> IrisPosition {
    let eye_width = outer_x - inner_x;
    if eye_width == 0.0 || !eye_width.is_finite() || !iris_x.is_finite() {
        trace!("Iris position unavailable, eye width {}", eye_width);
        return IrisPosition::Center;
    }

    let ratio = (iris_x - inner_x) / eye_width;
    if ratio < config.right_below {
        IrisPosition::Right
    } else if ratio > config.left_above {
        IrisPosition::Left
    } else {
        IrisPosition::Center
    }
}
